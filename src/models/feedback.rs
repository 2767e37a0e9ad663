use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
pub const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRating {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromSqliteRow for FeedbackRating {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            session_id: row.get("session_id")?,
            user_id: row.get("user_id")?,
            rating: row.get("rating")?,
            comment: row.get("comment")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl FeedbackRequest {
    /// Blank comments are stored as NULL.
    pub fn normalized_comment(&self) -> Option<String> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            ));
        }
        if let Some(comment) = &self.comment {
            if comment.chars().count() > MAX_COMMENT_CHARS {
                return Err(format!(
                    "comment must be at most {} characters",
                    MAX_COMMENT_CHARS
                ));
            }
        }
        Ok(())
    }
}
