use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{
    FromSqliteRow, PlanStatus, Session, SessionSummary, SessionTestWithName, TrainingPlan,
};

/// Assessment sessions and their per-muscle-test pain ratings.
#[derive(Clone)]
pub struct SessionRepository {
    pool: DbPool,
}

impl SessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a pending session and its `(muscle_test_id, pain_level)` rows
    /// in a single transaction.
    pub async fn create_with_tests(
        &self,
        user_id: &str,
        body_part_id: &str,
        tests: Vec<(String, u8)>,
    ) -> Result<Session> {
        let pool = self.pool.clone();
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            body_part_id: body_part_id.to_string(),
            plan_status: PlanStatus::Pending,
            training_plan: None,
            created_at: now,
            updated_at: now,
        };
        let row = session.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO sessions (id, user_id, body_part_id, plan_status, training_plan, created_at, updated_at)
                 VALUES (?, ?, ?, ?, NULL, ?, ?)",
                rusqlite::params![
                    row.id,
                    row.user_id,
                    row.body_part_id,
                    row.plan_status.as_str(),
                    row.created_at,
                    row.updated_at
                ],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO session_tests (id, session_id, muscle_test_id, pain_level)
                     VALUES (?, ?, ?, ?)",
                )?;
                for (muscle_test_id, pain_level) in &tests {
                    stmt.execute(rusqlite::params![
                        Uuid::new_v4().to_string(),
                        row.id,
                        muscle_test_id,
                        pain_level
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(session)
    }

    /// Owner-scoped lookup; another user's session reads as absent.
    pub async fn find_for_user(&self, id: &str, user_id: &str) -> Result<Option<Session>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM sessions WHERE id = ? AND user_id = ?")?;
            let result = stmt
                .query_row([&id, &user_id], Session::from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_tests(&self, session_id: &str) -> Result<Vec<SessionTestWithName>> {
        let pool = self.pool.clone();
        let session_id = session_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT st.muscle_test_id, mt.name AS muscle_test_name, st.pain_level
                 FROM session_tests st
                 JOIN muscle_tests mt ON st.muscle_test_id = mt.id
                 WHERE st.session_id = ?
                 ORDER BY mt.sort_order, mt.name",
            )?;
            let tests = stmt
                .query_map([&session_id], SessionTestWithName::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tests)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Newest first.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SessionSummary>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT s.id, bp.name AS body_part_name, s.plan_status, s.created_at,
                        (SELECT COUNT(*) FROM session_tests st WHERE st.session_id = s.id) AS test_count
                 FROM sessions s
                 JOIN body_parts bp ON s.body_part_id = bp.id
                 WHERE s.user_id = ?
                 ORDER BY s.created_at DESC, s.rowid DESC
                 LIMIT ? OFFSET ?",
            )?;
            let sessions = stmt
                .query_map(
                    rusqlite::params![user_id, limit, offset],
                    SessionSummary::from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sessions)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn count_for_user(&self, user_id: &str) -> Result<i64> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sessions WHERE user_id = ?",
                [&user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Store a generated plan and flip the status to `generated`.
    pub async fn set_plan(&self, id: &str, plan: &TrainingPlan) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let plan_json =
            serde_json::to_string(plan).map_err(|e| AppError::Internal(e.to_string()))?;
        let now = Utc::now();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE sessions SET training_plan = ?, plan_status = ?, updated_at = ? WHERE id = ?",
                rusqlite::params![plan_json, PlanStatus::Generated.as_str(), now, id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Mark generation as failed. A previously generated plan is left in place.
    pub async fn mark_plan_failed(&self, id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let now = Utc::now();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE sessions SET plan_status = ?, updated_at = ? WHERE id = ?",
                rusqlite::params![PlanStatus::Failed.as_str(), now, id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM sessions WHERE id = ? AND user_id = ?",
                [&id, &user_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
