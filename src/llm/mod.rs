//! Training plan generation through a chat-completion model.
//!
//! [`PlanGenerator`] is the seam the session flow depends on. Production
//! uses [`OpenAiPlanGenerator`]; tests plug in their own implementation.

pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{BodyPart, Exercise, MuscleTest, TrainingPlan};

pub use openai::OpenAiPlanGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A muscle test together with the pain the user reported on it.
#[derive(Debug, Clone)]
pub struct RatedTest {
    pub muscle_test: MuscleTest,
    pub pain_level: u8,
}

/// Everything the model needs to write a plan for one assessment.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub body_part: BodyPart,
    pub tests: Vec<RatedTest>,
    pub exercises: Vec<Exercise>,
}

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Produce a validated training plan or fail with `AppError::Upstream`.
    async fn generate(&self, request: &PlanRequest) -> Result<TrainingPlan>;
}
