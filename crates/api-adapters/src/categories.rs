//! Category endpoints. Writes carry no ownership concept; only admins hold a
//! grant, so the policy checks below deny everyone else.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use domains::{Category, CategoryUpdate, NewCategory};
use services::{Action, Resource, ResourceKind};

use crate::error::ApiResult;
use crate::extract::CurrentActor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{slug}", get(detail))
        .route("/id/{id}", axum::routing::put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.categories.list().await?))
}

async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.categories.get_by_slug(&slug).await?))
}

async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<NewCategory>,
) -> ApiResult<impl IntoResponse> {
    state
        .policy
        .assert_can_create(&actor, ResourceKind::Category)?;
    let category = state.categories.create(request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(request): Json<CategoryUpdate>,
) -> ApiResult<Json<Category>> {
    let category = state.categories.get(id).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Edit, &Resource::Category(&category))?;
    Ok(Json(state.categories.update(&category, request).await?))
}

async fn remove(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let category = state.categories.get(id).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Delete, &Resource::Category(&category))?;
    state.categories.delete(&category).await?;
    Ok(StatusCode::NO_CONTENT)
}
