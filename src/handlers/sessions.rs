use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{CreateSessionRequest, ListQuery, Page, SessionDto, SessionSummary};
use crate::repositories::SessionRepository;
use crate::services::SessionService;

#[derive(Clone)]
pub struct SessionsState {
    pub session_service: SessionService,
    pub session_repo: SessionRepository,
}

pub async fn list(
    State(state): State<SessionsState>,
    auth_user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<SessionSummary>>> {
    let (page, per_page, offset) = query.resolve();

    let items = state
        .session_repo
        .list_for_user(&auth_user.id, per_page, offset)
        .await?;
    let total = state.session_repo.count_for_user(&auth_user.id).await?;

    Ok(Json(Page::new(items, page, per_page, total)))
}

pub async fn create(
    State(state): State<SessionsState>,
    auth_user: AuthUser,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionDto>)> {
    let session = state
        .session_service
        .create_session(&auth_user.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn show(
    State(state): State<SessionsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SessionDto>> {
    Ok(Json(state.session_service.get_session(&auth_user.id, &id).await?))
}

pub async fn delete(
    State(state): State<SessionsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state
        .session_service
        .delete_session(&auth_user.id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn regenerate_plan(
    State(state): State<SessionsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SessionDto>> {
    Ok(Json(
        state
            .session_service
            .regenerate_plan(&auth_user.id, &id)
            .await?,
    ))
}
