//! Actor resolution from the `Authorization: Bearer` header. A missing
//! header resolves to the anonymous actor; a present-but-invalid token is a
//! hard 401 rather than a silent downgrade.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use domains::{Actor, DomainError, TokenIssuer, TokenPurpose};

use crate::error::ApiError;
use crate::state::AppState;

pub struct CurrentActor(pub Actor);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Self(Actor::Anonymous));
        };
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError(DomainError::InvalidToken))?;
        let account_id = state.tokens.verify(token, TokenPurpose::Session)?;
        let account = state
            .accounts
            .get(account_id)
            .await
            .map_err(|_| ApiError(DomainError::InvalidToken))?;
        Ok(Self(Actor::Account(account)))
    }
}
