//! Shared handler state, assembled once at process start.

use std::sync::Arc;

use domains::TokenIssuer;
use services::{AccountService, BlogService, CategoryService, CommentService, PolicyEngine};

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub blogs: BlogService,
    pub categories: CategoryService,
    pub comments: CommentService,
    pub policy: Arc<PolicyEngine>,
    pub tokens: Arc<dyn TokenIssuer>,
}
