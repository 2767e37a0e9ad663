use chrono::Utc;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{ErrorLog, FromSqliteRow};

/// Application error table. Writes are best-effort from the caller's
/// point of view; see [`ErrorLogRepository::record`].
#[derive(Clone)]
pub struct ErrorLogRepository {
    pool: DbPool,
}

impl ErrorLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        user_id: Option<&str>,
        source: &str,
        message: &str,
        context: Option<serde_json::Value>,
    ) -> Result<()> {
        let pool = self.pool.clone();
        let id = Uuid::new_v4().to_string();
        let user_id = user_id.map(str::to_string);
        let source = source.to_string();
        let message = message.to_string();
        let context = context.map(|c| c.to_string());
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO error_logs (id, user_id, source, message, context, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![id, user_id, source, message, context, now],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Record an error without letting a logging failure mask the original one.
    pub async fn record(
        &self,
        user_id: Option<&str>,
        source: &str,
        message: &str,
        context: Option<serde_json::Value>,
    ) {
        if let Err(e) = self.insert(user_id, source, message, context).await {
            tracing::error!(source, "Failed to write error log: {}", e);
        }
    }

    pub async fn list_recent(&self, limit: i64) -> Result<Vec<ErrorLog>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM error_logs ORDER BY created_at DESC, rowid DESC LIMIT ?",
            )?;
            let logs = stmt
                .query_map([limit], ErrorLog::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(logs)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
