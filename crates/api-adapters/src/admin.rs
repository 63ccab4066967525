//! The admin surface. Every handler opens with the `require_admin` gate and
//! nothing else; the finer per-resource rules play no part here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use domains::{Account, AccountAdminUpdate, Blog, BlogFilter};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extract::CurrentActor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts/{id}", axum::routing::put(update_account).delete(delete_account))
        .route("/blogs", get(list_blogs))
        .route("/blogs/{id}/regenerate-slug", post(regenerate_slug))
}

async fn list_accounts(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<Account>>> {
    state.policy.require_admin(&actor)?;
    Ok(Json(state.accounts.list().await?))
}

async fn update_account(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(request): Json<AccountAdminUpdate>,
) -> ApiResult<Json<Account>> {
    state.policy.require_admin(&actor)?;
    Ok(Json(state.accounts.admin_update(id, request).await?))
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    #[serde(default)]
    delete_blogs: bool,
}

async fn delete_account(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<StatusCode> {
    state.policy.require_admin(&actor)?;
    let target = state.accounts.get(id).await?;
    state.accounts.delete(&target, params.delete_blogs).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_blogs(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<Blog>>> {
    state.policy.require_admin(&actor)?;
    Ok(Json(state.blogs.list(BlogFilter::default()).await?))
}

async fn regenerate_slug(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> ApiResult<Json<Blog>> {
    state.policy.require_admin(&actor)?;
    let blog = state.blogs.get(id).await?;
    Ok(Json(state.blogs.regenerate_slug(&blog).await?))
}
