use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Deserializer, Serialize};

use super::{json_column, BodyPartRef, FeedbackRating, FromSqliteRow, TrainingPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Pending,
    Generated,
    Failed,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Pending => "pending",
            PlanStatus::Generated => "generated",
            PlanStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "generated" => PlanStatus::Generated,
            "failed" => PlanStatus::Failed,
            _ => PlanStatus::Pending,
        }
    }
}

/// One assessment: the body part examined and, once generated, its plan.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub body_part_id: String,
    pub plan_status: PlanStatus,
    pub training_plan: Option<TrainingPlan>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromSqliteRow for Session {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: String = row.get("plan_status")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            body_part_id: row.get("body_part_id")?,
            plan_status: PlanStatus::parse(&status),
            training_plan: json_column(row, "training_plan")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTestWithName {
    pub muscle_test_id: String,
    pub muscle_test_name: String,
    pub pain_level: u8,
}

impl FromSqliteRow for SessionTestWithName {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            muscle_test_id: row.get("muscle_test_id")?,
            muscle_test_name: row.get("muscle_test_name")?,
            pain_level: row.get("pain_level")?,
        })
    }
}

pub const MAX_PAIN_LEVEL: i64 = 10;
/// A body part has a handful of tests; anything past this is a client bug.
pub const MAX_TESTS_PER_SESSION: usize = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct MuscleTestRating {
    pub muscle_test_id: String,
    /// Kept wide so out-of-range input reaches validation instead of failing
    /// JSON decoding with a less helpful message.
    pub pain_level: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub body_part_id: String,
    #[serde(default)]
    pub tests: Vec<MuscleTestRating>,
}

impl CreateSessionRequest {
    /// Shape checks that need no database access.
    pub fn validate(&self) -> Result<(), String> {
        if self.body_part_id.trim().is_empty() {
            return Err("body_part_id is required".to_string());
        }
        if self.tests.is_empty() {
            return Err("At least one muscle test rating is required".to_string());
        }
        if self.tests.len() > MAX_TESTS_PER_SESSION {
            return Err(format!(
                "At most {} muscle test ratings are allowed",
                MAX_TESTS_PER_SESSION
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for test in &self.tests {
            if !(0..=MAX_PAIN_LEVEL).contains(&test.pain_level) {
                return Err(format!(
                    "pain_level for {} must be between 0 and {}",
                    test.muscle_test_id, MAX_PAIN_LEVEL
                ));
            }
            if !seen.insert(test.muscle_test_id.as_str()) {
                return Err(format!(
                    "Muscle test {} was rated more than once",
                    test.muscle_test_id
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    pub body_part: BodyPartRef,
    pub plan_status: PlanStatus,
    pub tests: Vec<SessionTestWithName>,
    pub training_plan: Option<TrainingPlan>,
    pub feedback: Option<FeedbackRating>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub body_part_name: String,
    pub plan_status: PlanStatus,
    pub test_count: i64,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for SessionSummary {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: String = row.get("plan_status")?;
        Ok(Self {
            id: row.get("id")?,
            body_part_name: row.get("body_part_name")?,
            plan_status: PlanStatus::parse(&status),
            test_count: row.get("test_count")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Deserialize an optional integer from a query string.
/// Handles empty strings by returning None instead of failing.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 50;
/// Keeps `(page - 1) * per_page` inside i64.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub per_page: Option<i64>,
}

impl ListQuery {
    /// (page, per_page, offset) with page >= 1 and per_page clamped.
    pub fn resolve(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        (page, per_page, (page - 1) * per_page)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        Self {
            items,
            page,
            per_page,
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}
