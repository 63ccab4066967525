//! Comment endpoints, mirroring the thread structure: list or create either
//! under a blog (new thread) or under a parent comment (reply).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use domains::{AuthorSelector, Comment, CommentFilter, CommentUpdate, NewComment};
use serde::Deserialize;
use services::{Action, Resource, ResourceKind};

use crate::error::ApiResult;
use crate::extract::CurrentActor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(list))
        .route("/blog/{blog_id}", get(list_for_blog).post(create_on_blog))
        .route("/parent/{parent_id}", get(list_replies).post(reply))
        .route("/{id}", get(detail).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    author: Option<i64>,
    #[serde(default)]
    unattributed: bool,
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Comment>>> {
    let author = if params.unattributed {
        Some(AuthorSelector::Unattributed)
    } else {
        params.author.map(AuthorSelector::Account)
    };
    let comments = state
        .comments
        .list(CommentFilter {
            author,
            ..Default::default()
        })
        .await?;
    Ok(Json(comments))
}

async fn list_for_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<i64>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = state
        .comments
        .list(CommentFilter {
            blog_id: Some(blog_id),
            ..Default::default()
        })
        .await?;
    Ok(Json(comments))
}

async fn list_replies(
    State(state): State<AppState>,
    Path(parent_id): Path<i64>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = state
        .comments
        .list(CommentFilter {
            parent_id: Some(parent_id),
            ..Default::default()
        })
        .await?;
    Ok(Json(comments))
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    body: String,
}

async fn create_on_blog(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(blog_id): Path<i64>,
    Json(payload): Json<CommentPayload>,
) -> ApiResult<impl IntoResponse> {
    state
        .policy
        .assert_can_create(&actor, ResourceKind::Comment)?;
    let comment = state
        .comments
        .create(
            &actor,
            NewComment {
                body: payload.body,
                blog_id: Some(blog_id),
                parent_id: None,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn reply(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(parent_id): Path<i64>,
    Json(payload): Json<CommentPayload>,
) -> ApiResult<impl IntoResponse> {
    state
        .policy
        .assert_can_create(&actor, ResourceKind::Comment)?;
    let comment = state
        .comments
        .create(
            &actor,
            NewComment {
                body: payload.body,
                blog_id: None,
                parent_id: Some(parent_id),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(state.comments.get(id).await?))
}

async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(request): Json<CommentUpdate>,
) -> ApiResult<Json<Comment>> {
    let comment = state.comments.get(id).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Edit, &Resource::Comment(&comment))?;
    Ok(Json(state.comments.update(&comment, request).await?))
}

async fn remove(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let comment = state.comments.get(id).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Delete, &Resource::Comment(&comment))?;
    state.comments.delete(&comment).await?;
    Ok(StatusCode::NO_CONTENT)
}
