use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};

/// Login tokens backing the `session` cookie.
#[derive(Clone)]
pub struct AuthSessionRepository {
    pool: DbPool,
}

impl AuthSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new auth session for a user. Returns the token.
    pub async fn create(&self, user_id: &str, ttl_days: i64) -> Result<String> {
        let pool = self.pool.clone();
        let token = Uuid::new_v4().to_string();
        let user_id = user_id.to_string();
        let now = Utc::now();
        let expires_at = chrono::Duration::try_days(ttl_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::Internal(format!("Invalid session TTL: {} days", ttl_days)))?;

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO auth_sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
                rusqlite::params![token, user_id, now, expires_at],
            )?;
            Ok(token)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Resolve a token to its user_id if it has not expired.
    /// An expired token is deleted on the spot.
    pub async fn find_valid(&self, token: &str) -> Result<Option<String>> {
        let pool = self.pool.clone();
        let token = token.to_string();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let result: Option<(String, DateTime<Utc>)> = conn
                .query_row(
                    "SELECT user_id, expires_at FROM auth_sessions WHERE token = ?",
                    [&token],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            match result {
                Some((_, expires_at)) if expires_at <= now => {
                    conn.execute("DELETE FROM auth_sessions WHERE token = ?", [&token])?;
                    Ok(None)
                }
                Some((user_id, _)) => Ok(Some(user_id)),
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Delete a single auth session (logout).
    pub async fn delete(&self, token: &str) -> Result<()> {
        let pool = self.pool.clone();
        let token = token.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute("DELETE FROM auth_sessions WHERE token = ?", [&token])?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Batch delete all expired auth sessions. Returns how many were removed.
    pub async fn cleanup_expired(&self) -> Result<usize> {
        let pool = self.pool.clone();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let removed = conn.execute(
                "DELETE FROM auth_sessions WHERE expires_at <= ?",
                rusqlite::params![now],
            )?;
            Ok(removed)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
