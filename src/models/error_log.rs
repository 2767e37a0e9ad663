use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::Serialize;

use super::{json_column, FromSqliteRow};

/// A failure recorded in the `error_logs` table for later inspection.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorLog {
    pub id: String,
    pub user_id: Option<String>,
    pub source: String,
    pub message: String,
    pub context: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for ErrorLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            source: row.get("source")?,
            message: row.get("message")?,
            context: json_column(row, "context")?,
            created_at: row.get("created_at")?,
        })
    }
}
