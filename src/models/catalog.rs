use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyPart {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sort_order: i64,
}

impl FromSqliteRow for BodyPart {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            sort_order: row.get("sort_order")?,
        })
    }
}

/// Compact body part reference embedded in session payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyPartRef {
    pub id: String,
    pub name: String,
}

impl From<&BodyPart> for BodyPartRef {
    fn from(part: &BodyPart) -> Self {
        Self {
            id: part.id.clone(),
            name: part.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuscleTest {
    pub id: String,
    pub body_part_id: String,
    pub name: String,
    pub description: String,
    pub instruction: String,
    pub sort_order: i64,
}

impl FromSqliteRow for MuscleTest {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            body_part_id: row.get("body_part_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            instruction: row.get("instruction")?,
            sort_order: row.get("sort_order")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub muscle_test_id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let difficulty: String = row.get("difficulty")?;
        Ok(Self {
            id: row.get("id")?,
            muscle_test_id: row.get("muscle_test_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            difficulty: Difficulty::parse(&difficulty),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disclaimer {
    pub id: String,
    pub version: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for Disclaimer {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            version: row.get("version")?,
            title: row.get("title")?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
        })
    }
}
