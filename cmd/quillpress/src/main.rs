//! # Quillpress Binary
//!
//! Assembles the application: settings, storage, adapters, services, router.
//! Every dependency is constructed here and passed down explicitly; nothing
//! is wired through global state.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::AppState;
use auth_adapters::{Argon2Hasher, JwtTokens};
use domains::TokenIssuer;
use secrecy::ExposeSecret;
use services::{
    AccountService, BlogService, CategoryService, CommentService, LogMailer, PolicyEngine,
    PolicyOptions,
};
use storage_adapters::{
    SqliteAccountRepo, SqliteBlogRepo, SqliteCategoryRepo, SqliteCommentRepo,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = configs::Settings::load().context("failed to load settings")?;

    let pool = storage_adapters::connect(&settings.database.url)
        .await
        .context("failed to open database")?;

    let accounts_repo = Arc::new(SqliteAccountRepo::new(pool.clone()));
    let blogs_repo = Arc::new(SqliteBlogRepo::new(pool.clone()));
    let categories_repo = Arc::new(SqliteCategoryRepo::new(pool.clone()));
    let comments_repo = Arc::new(SqliteCommentRepo::new(pool.clone()));

    let hasher = Arc::new(Argon2Hasher);
    let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtTokens::new(
        settings.auth.secret_key.expose_secret().as_bytes(),
    ));
    let mailer = Arc::new(LogMailer);
    let policy = Arc::new(PolicyEngine::new(PolicyOptions {
        always_confirmed: settings.auth.always_confirmed,
    }));

    let state = AppState {
        accounts: AccountService::new(
            accounts_repo,
            blogs_repo.clone(),
            hasher,
            tokens.clone(),
            mailer,
            policy.clone(),
        )
        .with_token_ttl(settings.auth.token_ttl_secs),
        blogs: BlogService::new(blogs_repo.clone(), blogs_repo.clone()),
        categories: CategoryService::new(categories_repo.clone(), categories_repo),
        comments: CommentService::new(comments_repo, blogs_repo, policy.clone()),
        policy,
        tokens,
    };

    let app = api_adapters::router(state);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "quillpress listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
