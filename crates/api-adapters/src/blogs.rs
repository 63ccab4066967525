//! Blog endpoints. Reads are scoped through the policy engine's collection
//! decision, so drafts are visible only to their author and admins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use domains::{
    AuthorSelector, Blog, BlogFilter, BlogUpdate, Category, DomainError, NewBlog,
};
use serde::Deserialize;
use services::blogs::BlogArchive;
use services::{Action, Resource, ResourceKind};

use crate::error::ApiResult;
use crate::extract::CurrentActor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/archive", get(archive))
        .route("/{slug}", get(detail))
        .route("/{slug}/categories", get(categories))
        .route("/id/{id}", axum::routing::put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    author: Option<i64>,
    #[serde(default)]
    unattributed: bool,
    category: Option<i64>,
    published: Option<bool>,
}

async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Blog>>> {
    let decision = state
        .policy
        .evaluate_collection(&actor, Action::Read, ResourceKind::Blog);
    if !decision.allowed {
        return Err(DomainError::Forbidden("cannot read blogs".to_string()).into());
    }
    let author = if params.unattributed {
        Some(AuthorSelector::Unattributed)
    } else {
        params.author.map(AuthorSelector::Account)
    };
    let mut blogs = state
        .blogs
        .list(BlogFilter {
            author,
            category_id: params.category,
            published: params.published,
        })
        .await?;
    if !decision.is_unrestricted() {
        blogs.retain(|blog| decision.permits(&Resource::Blog(blog)));
    }
    Ok(Json(blogs))
}

#[derive(Debug, Deserialize)]
struct ArchiveParams {
    published: Option<bool>,
}

async fn archive(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<ArchiveParams>,
) -> ApiResult<Json<BlogArchive>> {
    let decision = state
        .policy
        .evaluate_collection(&actor, Action::Read, ResourceKind::Blog);
    // Only unrestricted readers may browse beyond the published archive.
    let published = if decision.is_unrestricted() {
        params.published
    } else {
        Some(true)
    };
    Ok(Json(state.blogs.archive(published).await?))
}

async fn detail(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(slug): Path<String>,
) -> ApiResult<Json<Blog>> {
    // Missing blogs are 404; existing-but-hidden ones are 403.
    let blog = state.blogs.get_by_slug(&slug).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Read, &Resource::Blog(&blog))?;
    Ok(Json(blog))
}

async fn categories(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<Category>>> {
    let blog = state.blogs.get_by_slug(&slug).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Read, &Resource::Blog(&blog))?;
    Ok(Json(state.blogs.categories_of(&blog).await?))
}

async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<NewBlog>,
) -> ApiResult<impl IntoResponse> {
    state.policy.assert_can_create(&actor, ResourceKind::Blog)?;
    let author = actor
        .account()
        .ok_or_else(|| DomainError::Forbidden("cannot create a blog".to_string()))?;
    let blog = state.blogs.create(author, request).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(request): Json<BlogUpdate>,
) -> ApiResult<Json<Blog>> {
    let blog = state.blogs.get(id).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Edit, &Resource::Blog(&blog))?;
    Ok(Json(state.blogs.update(&blog, request).await?))
}

async fn remove(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let blog = state.blogs.get(id).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Delete, &Resource::Blog(&blog))?;
    state.blogs.delete(&blog).await?;
    Ok(StatusCode::NO_CONTENT)
}
