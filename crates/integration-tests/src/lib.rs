//! Test harness: a full application wired over an in-memory database,
//! assembled exactly the way the production binary does it.

use std::sync::Arc;

use api_adapters::AppState;
use auth_adapters::{Argon2Hasher, JwtTokens};
use axum::Router;
use domains::{Account, Actor, NewAccount, TokenIssuer, TokenPurpose};
use services::{
    AccountService, BlogService, CategoryService, CommentService, LogMailer, PolicyEngine,
    PolicyOptions,
};
use storage_adapters::{
    SqliteAccountRepo, SqliteBlogRepo, SqliteCategoryRepo, SqliteCommentRepo,
};

const TEST_SECRET: &[u8] = b"integration-test-secret";

pub struct TestHarness {
    pub accounts: AccountService,
    pub blogs: BlogService,
    pub categories: CategoryService,
    pub comments: CommentService,
    pub policy: Arc<PolicyEngine>,
    pub tokens: Arc<dyn TokenIssuer>,
}

/// Build a harness with the default policy options.
pub async fn harness() -> TestHarness {
    harness_with(PolicyOptions::default()).await
}

pub async fn harness_with(options: PolicyOptions) -> TestHarness {
    let pool = storage_adapters::connect_in_memory()
        .await
        .expect("in-memory database should open");

    let accounts_repo = Arc::new(SqliteAccountRepo::new(pool.clone()));
    let blogs_repo = Arc::new(SqliteBlogRepo::new(pool.clone()));
    let categories_repo = Arc::new(SqliteCategoryRepo::new(pool.clone()));
    let comments_repo = Arc::new(SqliteCommentRepo::new(pool.clone()));

    let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtTokens::new(TEST_SECRET));
    let policy = Arc::new(PolicyEngine::new(options));

    TestHarness {
        accounts: AccountService::new(
            accounts_repo,
            blogs_repo.clone(),
            Arc::new(Argon2Hasher),
            tokens.clone(),
            Arc::new(LogMailer),
            policy.clone(),
        ),
        blogs: BlogService::new(blogs_repo.clone(), blogs_repo.clone()),
        categories: CategoryService::new(categories_repo.clone(), categories_repo),
        comments: CommentService::new(comments_repo, blogs_repo, policy.clone()),
        policy,
        tokens,
    }
}

impl TestHarness {
    pub fn app_state(&self) -> AppState {
        AppState {
            accounts: self.accounts.clone(),
            blogs: self.blogs.clone(),
            categories: self.categories.clone(),
            comments: self.comments.clone(),
            policy: self.policy.clone(),
            tokens: self.tokens.clone(),
        }
    }

    pub fn router(&self) -> Router {
        api_adapters::router(self.app_state())
    }

    /// Register an (unconfirmed) account.
    pub async fn register_account(&self, username: &str) -> Account {
        self.accounts
            .register(NewAccount {
                username: username.to_string(),
                display: None,
                email: format!("{username}@example.org"),
                password: "hunter2".to_string(),
            })
            .await
            .expect("registration should succeed")
    }

    /// Register an account and walk it through the confirmation exchange.
    pub async fn confirmed_account(&self, username: &str) -> Account {
        let account = self.register_account(username).await;
        let token = self
            .tokens
            .issue(account.id, TokenPurpose::ConfirmEmail, 600)
            .expect("token should issue");
        self.accounts
            .confirm_email(&token)
            .await
            .expect("confirmation should succeed")
    }

    /// A confirmed admin account.
    pub async fn admin_account(&self, username: &str) -> Account {
        let account = self.confirmed_account(username).await;
        self.accounts
            .admin_update(
                account.id,
                domains::AccountAdminUpdate {
                    admin: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("promotion should succeed")
    }

    /// A bearer token for the given account.
    pub fn session_token(&self, account: &Account) -> String {
        self.tokens
            .issue(account.id, TokenPurpose::Session, 3600)
            .expect("session token should issue")
    }
}

/// Convenience wrapper for policy checks in tests.
pub fn as_actor(account: &Account) -> Actor {
    Actor::Account(account.clone())
}
