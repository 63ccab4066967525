//! # Request Structures
//!
//! Typed creation and update payloads crossing the domain boundary. Each
//! struct enumerates the exact fields the operation may touch; unknown fields
//! are rejected at the boundary rather than inside the entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Registration payload. The password arrives in plaintext and is hashed by
/// the account service before it reaches a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    /// Optional public name; blank or missing falls back to the username.
    pub display: Option<String>,
    pub email: String,
    pub password: String,
}

/// Fields an account may change about itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountProfileUpdate {
    pub username: Option<String>,
    /// `Some("")` resets the display name back to the username.
    pub display: Option<String>,
    pub email: Option<String>,
    pub about: Option<String>,
    pub password: Option<String>,
}

/// The broader field set the admin surface may change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountAdminUpdate {
    #[serde(flatten)]
    pub profile: AccountProfileUpdate,
    pub admin: Option<bool>,
    pub confirmed: Option<bool>,
}

/// Storage-level account creation record. The password is already hashed.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub username: String,
    pub display: String,
    pub email: String,
    pub password: String,
    pub admin: bool,
    pub confirmed: bool,
}

/// Storage-level account change set. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub display: Option<String>,
    pub email: Option<String>,
    /// Already hashed.
    pub password: Option<String>,
    pub about: Option<String>,
    pub admin: Option<bool>,
    pub confirmed: Option<bool>,
    pub seen_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Blogs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NewBlog {
    pub title: String,
    pub description: Option<String>,
    pub body: String,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub comment: bool,
}

/// Blog change set. The slug is deliberately absent: it is immutable except
/// through forced regeneration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub category_ids: Option<Vec<i64>>,
    pub published: Option<bool>,
    pub comment: Option<bool>,
}

/// Storage-level blog creation record, slug already allocated.
#[derive(Debug, Clone)]
pub struct BlogRecord {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub body: String,
    pub published: bool,
    pub comment: bool,
    pub author_id: Option<i64>,
    pub category_ids: Vec<i64>,
}

/// Storage-level blog change set.
#[derive(Debug, Clone, Default)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
    pub comment: Option<bool>,
    /// `Some(None)` detaches the author (sets the column to NULL).
    pub author_id: Option<Option<i64>>,
    pub category_ids: Option<Vec<i64>>,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub title: String,
    pub description: String,
}

/// Title and description only; the slug never changes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CategoryRecord {
    pub title: String,
    pub slug: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Comment creation payload. Exactly one of `blog_id` / `parent_id` is
/// required; a parent overrides a directly-supplied blog.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub body: String,
    pub blog_id: Option<i64>,
    pub parent_id: Option<i64>,
}

/// Authors may edit the body, nothing else.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentUpdate {
    pub body: String,
}

/// Storage-level comment creation record. The adapter performs the two-phase
/// insert-then-path write in one transaction, deriving the path from
/// `parent_path` and the freshly assigned id.
#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub body: String,
    pub author_id: Option<i64>,
    pub blog_id: i64,
    pub parent_id: Option<i64>,
    pub parent_path: Option<String>,
    pub thread_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Query filters
// ---------------------------------------------------------------------------

/// Selects comments/blogs by author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorSelector {
    /// Rows whose author is the given account.
    Account(i64),
    /// Rows whose author was deleted (author column NULL).
    Unattributed,
}

#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub author: Option<AuthorSelector>,
    pub category_id: Option<i64>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    pub author: Option<AuthorSelector>,
    pub blog_id: Option<i64>,
    pub parent_id: Option<i64>,
}
