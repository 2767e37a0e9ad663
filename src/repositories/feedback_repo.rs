use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FeedbackRating, FromSqliteRow};

#[derive(Clone)]
pub struct FeedbackRepository {
    pool: DbPool,
}

impl FeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the user's rating for a session.
    /// `created_at` survives a replacement; `updated_at` moves.
    pub async fn upsert(
        &self,
        session_id: &str,
        user_id: &str,
        rating: i64,
        comment: Option<String>,
    ) -> Result<FeedbackRating> {
        let pool = self.pool.clone();
        let id = Uuid::new_v4().to_string();
        let session_id = session_id.to_string();
        let user_id = user_id.to_string();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO feedback_ratings (id, session_id, user_id, rating, comment, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(session_id, user_id)
                 DO UPDATE SET rating = excluded.rating,
                               comment = excluded.comment,
                               updated_at = excluded.updated_at",
                rusqlite::params![id, session_id, user_id, rating, comment, now, now],
            )?;
            let feedback = conn.query_row(
                "SELECT * FROM feedback_ratings WHERE session_id = ? AND user_id = ?",
                [&session_id, &user_id],
                FeedbackRating::from_row,
            )?;
            Ok(feedback)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find(&self, session_id: &str, user_id: &str) -> Result<Option<FeedbackRating>> {
        let pool = self.pool.clone();
        let session_id = session_id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn
                .prepare("SELECT * FROM feedback_ratings WHERE session_id = ? AND user_id = ?")?;
            let result = stmt
                .query_row([&session_id, &user_id], FeedbackRating::from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
