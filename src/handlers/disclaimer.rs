use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{Disclaimer, UserDto};
use crate::repositories::{CatalogRepository, UserRepository};

#[derive(Clone)]
pub struct DisclaimerState {
    pub catalog_repo: CatalogRepository,
    pub user_repo: UserRepository,
}

#[derive(Serialize)]
pub struct DisclaimerResponse {
    pub disclaimer: Disclaimer,
    pub accepted_at: Option<DateTime<Utc>>,
}

pub async fn show(
    State(state): State<DisclaimerState>,
    auth_user: AuthUser,
) -> Result<Json<DisclaimerResponse>> {
    let disclaimer = state
        .catalog_repo
        .current_disclaimer()
        .await?
        .ok_or_else(|| AppError::NotFound("No disclaimer configured".to_string()))?;

    Ok(Json(DisclaimerResponse {
        disclaimer,
        accepted_at: auth_user.disclaimer_accepted_at,
    }))
}

pub async fn accept(
    State(state): State<DisclaimerState>,
    auth_user: AuthUser,
) -> Result<Json<UserDto>> {
    let accepted_at = state.user_repo.accept_disclaimer(&auth_user.id).await?;
    tracing::info!(user_id = %auth_user.id, %accepted_at, "Disclaimer accepted");

    let user = state
        .user_repo
        .find_by_id(&auth_user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(UserDto::from(user)))
}
