//! # Core Traits (Ports)
//!
//! Contracts the adapter crates implement. Services receive these as
//! `Arc<dyn Trait>` handles, constructed explicitly at process start.
//!
//! With the `testing` feature enabled, mockall generates `MockXxx` types for
//! every port so external test crates can exercise the services in isolation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Account, Blog, Category, Comment};
use crate::requests::{
    AccountPatch, AccountRecord, BlogFilter, BlogPatch, BlogRecord, CategoryRecord,
    CategoryUpdate, CommentFilter, CommentRecord,
};

/// Account persistence contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn insert(&self, record: AccountRecord) -> Result<Account>;
    async fn get(&self, id: i64) -> Result<Option<Account>>;
    /// Case-insensitive lookup by username and/or email.
    async fn find<'a>(&self, username: Option<&'a str>, email: Option<&'a str>) -> Result<Option<Account>>;
    async fn list(&self) -> Result<Vec<Account>>;
    async fn update(&self, id: i64, patch: AccountPatch) -> Result<Account>;
    async fn delete(&self, id: i64) -> Result<()>;
    /// Record account activity without bumping `updated_at`.
    async fn touch_seen(&self, id: i64, at: DateTime<Utc>) -> Result<()>;
}

/// Blog persistence contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BlogRepo: Send + Sync {
    async fn insert(&self, record: BlogRecord) -> Result<Blog>;
    async fn get(&self, id: i64) -> Result<Option<Blog>>;
    /// Case-insensitive slug lookup.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>>;
    async fn list(&self, filter: BlogFilter) -> Result<Vec<Blog>>;
    async fn update(&self, id: i64, patch: BlogPatch) -> Result<Blog>;
    async fn delete(&self, id: i64) -> Result<()>;
    async fn categories_of(&self, blog_id: i64) -> Result<Vec<Category>>;
}

/// Category persistence contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CategoryRepo: Send + Sync {
    async fn insert(&self, record: CategoryRecord) -> Result<Category>;
    async fn get(&self, id: i64) -> Result<Option<Category>>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;
    /// All categories, ordered by title descending.
    async fn list(&self) -> Result<Vec<Category>>;
    async fn update(&self, id: i64, update: CategoryUpdate) -> Result<Category>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Comment persistence contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// Insert a comment and assign its materialized path. Both writes happen
    /// inside one transaction: the path needs the freshly assigned row id, and
    /// a comment must never persist with an empty path.
    async fn insert(&self, record: CommentRecord) -> Result<Comment>;
    async fn get(&self, id: i64) -> Result<Option<Comment>>;
    /// Matching comments ordered by `(thread_at DESC, path ASC)`: newest
    /// threads first, pre-order traversal within each thread.
    async fn list(&self, filter: CommentFilter) -> Result<Vec<Comment>>;
    async fn update_body(&self, id: i64, body: &str) -> Result<Comment>;
    /// Delete the comment at `path` and every descendant (prefix match).
    /// Returns the number of rows removed.
    async fn delete_subtree(&self, path: &str) -> Result<u64>;
}

/// Existence check for one slug namespace. Implemented only by adapters whose
/// entity carries a slug column, which keeps "no slug field" unrepresentable.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SlugIndex: Send + Sync {
    async fn slug_exists(&self, slug: &str) -> Result<bool>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// What a token authorizes. Verification fails on a purpose mismatch, so a
/// reset token can never confirm an email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    ConfirmEmail,
    ResetPassword,
    Session,
}

/// Time-limited token contract. Expiry is embedded in the token itself and
/// checked at verification time.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, account_id: i64, purpose: TokenPurpose, expires_in_secs: i64)
        -> Result<String>;
    /// Returns the account id the token was issued for.
    fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<i64>;
}

/// Outbound mail contract. Dispatch is fire-and-forget; implementations must
/// not assume any ordering relative to the request that triggered them.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_account_confirmation(&self, account: &Account, token: &str) -> Result<()>;
    async fn send_password_reset(&self, account: &Account, token: &str) -> Result<()>;
}
