//! Account endpoints: registration, login, token exchanges and self-service
//! CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use domains::{Account, AccountProfileUpdate, NewAccount, TokenIssuer, TokenPurpose};
use serde::{Deserialize, Serialize};
use services::{Action, Resource};

use crate::error::ApiResult;
use crate::extract::CurrentActor;
use crate::state::AppState;

/// Session lifetime handed out at login.
const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 14;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/login", post(login))
        .route("/confirm/{token}", post(confirm))
        .route("/reset", post(request_reset))
        .route("/reset/{token}", post(reset))
        .route("/{id}", get(detail).put(update).delete(remove))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<NewAccount>,
) -> ApiResult<impl IntoResponse> {
    let account = state.accounts.register(request).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    account: Account,
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let account = state
        .accounts
        .check_login(&request.email, &request.password)
        .await?;
    let token = state
        .tokens
        .issue(account.id, TokenPurpose::Session, SESSION_TTL_SECS)?;
    Ok(Json(LoginResponse { token, account }))
}

async fn confirm(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.accounts.confirm_email(&token).await?))
}

#[derive(Debug, Deserialize)]
struct ResetRequest {
    email: String,
}

async fn request_reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> ApiResult<StatusCode> {
    state.accounts.request_password_reset(&request.email).await?;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
struct ResetPayload {
    password: String,
}

async fn reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPayload>,
) -> ApiResult<Json<Account>> {
    Ok(Json(
        state.accounts.reset_password(&token, &payload.password).await?,
    ))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Account>>> {
    // Accounts are universally readable; no policy filtering needed.
    Ok(Json(state.accounts.list().await?))
}

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.accounts.get(id).await?))
}

async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(request): Json<AccountProfileUpdate>,
) -> ApiResult<Json<Account>> {
    let target = state.accounts.get(id).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Edit, &Resource::Account(&target))?;
    Ok(Json(state.accounts.update_profile(id, request).await?))
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    #[serde(default)]
    delete_blogs: bool,
}

async fn remove(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<StatusCode> {
    let target = state.accounts.get(id).await?;
    state
        .policy
        .assert_allowed(&actor, Action::Delete, &Resource::Account(&target))?;
    state.accounts.delete(&target, params.delete_blogs).await?;
    Ok(StatusCode::NO_CONTENT)
}
