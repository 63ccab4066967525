//! Seeds a fresh database with an admin account and a small sample content
//! tree: one category, one published blog, one comment thread.

use std::sync::Arc;

use anyhow::Context;
use auth_adapters::{Argon2Hasher, JwtTokens};
use domains::{
    AccountAdminUpdate, Actor, NewAccount, NewBlog, NewCategory, NewComment, TokenIssuer,
};
use secrecy::ExposeSecret;
use services::{
    AccountService, BlogService, CategoryService, CommentService, LogMailer, PolicyEngine,
    PolicyOptions,
};
use storage_adapters::{
    SqliteAccountRepo, SqliteBlogRepo, SqliteCategoryRepo, SqliteCommentRepo,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let settings = configs::Settings::load().context("failed to load settings")?;
    let pool = storage_adapters::connect(&settings.database.url)
        .await
        .context("failed to open database")?;

    let accounts_repo = Arc::new(SqliteAccountRepo::new(pool.clone()));
    let blogs_repo = Arc::new(SqliteBlogRepo::new(pool.clone()));
    let categories_repo = Arc::new(SqliteCategoryRepo::new(pool.clone()));
    let comments_repo = Arc::new(SqliteCommentRepo::new(pool.clone()));

    let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtTokens::new(
        settings.auth.secret_key.expose_secret().as_bytes(),
    ));
    let policy = Arc::new(PolicyEngine::new(PolicyOptions {
        always_confirmed: settings.auth.always_confirmed,
    }));
    let accounts = AccountService::new(
        accounts_repo,
        blogs_repo.clone(),
        Arc::new(Argon2Hasher),
        tokens,
        Arc::new(LogMailer),
        policy.clone(),
    );
    let blogs = BlogService::new(blogs_repo.clone(), blogs_repo.clone());
    let categories = CategoryService::new(categories_repo.clone(), categories_repo);
    let comments = CommentService::new(comments_repo, blogs_repo, policy);

    let password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "change me".to_string());
    let registered = accounts
        .register(NewAccount {
            username: "admin".to_string(),
            display: Some("Administrator".to_string()),
            email: "admin@example.org".to_string(),
            password,
        })
        .await
        .context("failed to create admin account")?;
    let admin = accounts
        .admin_update(
            registered.id,
            AccountAdminUpdate {
                admin: Some(true),
                confirmed: Some(true),
                ..Default::default()
            },
        )
        .await
        .context("failed to promote admin account")?;
    tracing::info!(account = admin.id, "admin account ready");

    let category = categories
        .create(NewCategory {
            title: "General".to_string(),
            description: "Everything that fits nowhere else".to_string(),
        })
        .await
        .context("failed to create category")?;

    let blog = blogs
        .create(
            &admin,
            NewBlog {
                title: "Hello, world".to_string(),
                description: Some("The first post".to_string()),
                body: "Welcome to Quillpress.".to_string(),
                category_ids: vec![category.id],
                published: true,
                comment: true,
            },
        )
        .await
        .context("failed to create blog")?;

    let actor = Actor::Account(admin);
    let root = comments
        .create(
            &actor,
            NewComment {
                body: "First!".to_string(),
                blog_id: Some(blog.id),
                parent_id: None,
            },
        )
        .await
        .context("failed to create comment")?;
    comments
        .create(
            &actor,
            NewComment {
                body: "And a nested reply.".to_string(),
                blog_id: None,
                parent_id: Some(root.id),
            },
        )
        .await
        .context("failed to create reply")?;

    tracing::info!(blog = blog.id, slug = %blog.slug, "seed data in place");
    Ok(())
}
