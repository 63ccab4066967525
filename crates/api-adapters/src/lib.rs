//! # api-adapters
//!
//! The REST surface for Quillpress. Handlers resolve the current actor, call
//! `assert_allowed` explicitly at the top of the handler body, then invoke
//! the services; there is no hidden authorization control flow. The admin
//! sub-router is gated solely by `require_admin`.

pub mod admin;
pub mod error;
pub mod extract;
pub mod state;

mod accounts;
mod blogs;
mod categories;
mod comments;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/accounts", accounts::router())
        .nest("/api/v1/blogs", blogs::router())
        .nest("/api/v1/categories", categories::router())
        .nest("/api/v1/comments", comments::router())
        .nest("/admin", admin::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
