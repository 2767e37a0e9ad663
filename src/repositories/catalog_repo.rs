use rusqlite::OptionalExtension;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{BodyPart, Disclaimer, Exercise, FromSqliteRow, MuscleTest};

/// Read-only access to the seeded catalog: body parts, muscle tests,
/// exercises and disclaimers.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: DbPool,
}

/// `?, ?, ?` for an `IN (...)` clause of the given arity.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

impl CatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_body_parts(&self) -> Result<Vec<BodyPart>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM body_parts ORDER BY sort_order, name")?;
            let parts = stmt
                .query_map([], BodyPart::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(parts)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_body_part(&self, id: &str) -> Result<Option<BodyPart>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM body_parts WHERE id = ?")?;
            let result = stmt.query_row([&id], BodyPart::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn list_muscle_tests(&self, body_part_id: &str) -> Result<Vec<MuscleTest>> {
        let pool = self.pool.clone();
        let body_part_id = body_part_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM muscle_tests WHERE body_part_id = ? ORDER BY sort_order, name",
            )?;
            let tests = stmt
                .query_map([&body_part_id], MuscleTest::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tests)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Fetch the muscle tests with the given IDs; unknown IDs are simply absent.
    pub async fn find_muscle_tests_by_ids(&self, ids: &[String]) -> Result<Vec<MuscleTest>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let pool = self.pool.clone();
        let ids = ids.to_vec();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let sql = format!(
                "SELECT * FROM muscle_tests WHERE id IN ({}) ORDER BY sort_order, name",
                placeholders(ids.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let tests = stmt
                .query_map(rusqlite::params_from_iter(ids.iter()), MuscleTest::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tests)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Exercises linked to any of the given muscle tests.
    pub async fn list_exercises_for_tests(&self, muscle_test_ids: &[String]) -> Result<Vec<Exercise>> {
        if muscle_test_ids.is_empty() {
            return Ok(Vec::new());
        }
        let pool = self.pool.clone();
        let ids = muscle_test_ids.to_vec();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let sql = format!(
                "SELECT * FROM exercises WHERE muscle_test_id IN ({}) ORDER BY muscle_test_id, name",
                placeholders(ids.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let exercises = stmt
                .query_map(rusqlite::params_from_iter(ids.iter()), Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// The disclaimer with the highest version.
    pub async fn current_disclaimer(&self) -> Result<Option<Disclaimer>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM disclaimers ORDER BY version DESC LIMIT 1")?;
            let result = stmt.query_row([], Disclaimer::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
