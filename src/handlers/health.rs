use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::db::DbPool;
use crate::version::GIT_VERSION;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
    git_version: &'static str,
}

/// Liveness plus a trivial query against the database.
pub async fn health_check(State(pool): State<DbPool>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = tokio::task::spawn_blocking(move || {
        pool.get()
            .ok()
            .and_then(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).ok())
            .is_some()
    })
    .await
    .unwrap_or(false);

    let (status, code) = if database_ok {
        ("ok", StatusCode::OK)
    } else {
        tracing::warn!("Health check: database unavailable");
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(HealthResponse {
            status,
            database: if database_ok { "ok" } else { "unavailable" },
            git_version: GIT_VERSION,
        }),
    )
}
