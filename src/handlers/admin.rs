use axum::{extract::State, Json};

use crate::error::Result;
use crate::middleware::AdminUser;
use crate::models::ErrorLog;
use crate::repositories::ErrorLogRepository;

const ERROR_LOG_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct AdminState {
    pub error_log_repo: ErrorLogRepository,
}

pub async fn error_logs(
    State(state): State<AdminState>,
    _admin_user: AdminUser,
) -> Result<Json<Vec<ErrorLog>>> {
    Ok(Json(state.error_log_repo.list_recent(ERROR_LOG_LIMIT).await?))
}
