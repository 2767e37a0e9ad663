use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{FeedbackRating, FeedbackRequest};
use crate::repositories::FeedbackRepository;
use crate::services::SessionService;

#[derive(Clone)]
pub struct FeedbackState {
    pub session_service: SessionService,
    pub feedback_repo: FeedbackRepository,
}

pub async fn submit(
    State(state): State<FeedbackState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackRating>)> {
    request.validate().map_err(AppError::Validation)?;
    let session = state
        .session_service
        .find_owned(&auth_user.id, &session_id)
        .await?;

    let feedback = state
        .feedback_repo
        .upsert(
            &session.id,
            &auth_user.id,
            request.rating,
            request.normalized_comment(),
        )
        .await?;
    tracing::info!(session_id = %session.id, rating = feedback.rating, "Feedback recorded");

    Ok((StatusCode::CREATED, Json(feedback)))
}

pub async fn show(
    State(state): State<FeedbackState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<FeedbackRating>> {
    let session = state
        .session_service
        .find_owned(&auth_user.id, &session_id)
        .await?;

    state
        .feedback_repo
        .find(&session.id, &auth_user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No feedback for this session".to_string()))
}
