use serde::{Deserialize, Deserializer, Serialize};

/// Structured training plan as produced by the plan generator and stored
/// as JSON on the session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,
    #[serde(default)]
    pub precautions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    /// Catalog exercise this entry refers to, when the model picked one.
    #[serde(default)]
    pub exercise_id: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_count")]
    pub sets: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub reps: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Models answer `"reps": 10`, `"reps": "10-12"` and `"reps": "30 s"` alike.
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) if s.trim().is_empty() => None,
        Some(Raw::Text(s)) => Some(s.trim().to_string()),
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(n)) => Some(n.to_string()),
        None => None,
    })
}

/// `"sets": 3`, `3.0` and `"3"` all mean three sets. Anything that is not a
/// whole non-negative count is dropped rather than failing the plan.
fn deserialize_lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(n)) => u32::try_from(n).ok(),
        Some(Raw::Float(n)) if n.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&n) => {
            Some(n as u32)
        }
        Some(Raw::Float(_)) => None,
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
