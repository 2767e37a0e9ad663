use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::error::{AppError, Result};
use crate::llm::{PlanGenerator, PlanRequest, RatedTest};
use crate::models::{
    BodyPart, BodyPartRef, CreateSessionRequest, MuscleTest, PlanStatus, Session, SessionDto,
};
use crate::repositories::{
    CatalogRepository, ErrorLogRepository, FeedbackRepository, SessionRepository,
};

pub const PLAN_GENERATION_SOURCE: &str = "plan_generation";

/// Assessment workflow: validate ratings, persist the session, ask the
/// plan generator for a training plan and store it.
#[derive(Clone)]
pub struct SessionService {
    pub catalog_repo: CatalogRepository,
    pub session_repo: SessionRepository,
    pub feedback_repo: FeedbackRepository,
    pub error_log_repo: ErrorLogRepository,
    pub plan_generator: Arc<dyn PlanGenerator>,
}

impl SessionService {
    pub async fn create_session(
        &self,
        user_id: &str,
        request: CreateSessionRequest,
    ) -> Result<SessionDto> {
        request.validate().map_err(AppError::Validation)?;

        let body_part = self
            .catalog_repo
            .find_body_part(&request.body_part_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Body part not found".to_string()))?;

        let ids: Vec<String> = request
            .tests
            .iter()
            .map(|t| t.muscle_test_id.clone())
            .collect();
        let muscle_tests = self.catalog_repo.find_muscle_tests_by_ids(&ids).await?;
        check_tests_belong(&body_part, &ids, &muscle_tests)?;

        let ratings: Vec<(String, u8)> = request
            .tests
            .iter()
            .map(|t| (t.muscle_test_id.clone(), t.pain_level as u8))
            .collect();
        let session = self
            .session_repo
            .create_with_tests(user_id, &body_part.id, ratings)
            .await?;
        tracing::info!(session_id = %session.id, body_part = %body_part.id, "Session created");

        let pain_by_test: HashMap<&str, u8> = request
            .tests
            .iter()
            .map(|t| (t.muscle_test_id.as_str(), t.pain_level as u8))
            .collect();
        let rated = muscle_tests
            .into_iter()
            .map(|muscle_test| {
                let pain_level = pain_by_test
                    .get(muscle_test.id.as_str())
                    .copied()
                    .unwrap_or_default();
                RatedTest {
                    muscle_test,
                    pain_level,
                }
            })
            .collect();

        let session = self
            .generate_and_store(user_id, session, &body_part, rated)
            .await?;
        self.to_dto(user_id, session, &body_part).await
    }

    /// Run plan generation again for an existing session, whatever its status.
    pub async fn regenerate_plan(&self, user_id: &str, session_id: &str) -> Result<SessionDto> {
        let session = self.find_owned(user_id, session_id).await?;
        let body_part = self.body_part_of(&session).await?;

        let tests = self.session_repo.find_tests(&session.id).await?;
        let ids: Vec<String> = tests.iter().map(|t| t.muscle_test_id.clone()).collect();
        let pain_by_test: HashMap<String, u8> = tests
            .into_iter()
            .map(|t| (t.muscle_test_id, t.pain_level))
            .collect();
        let rated = self
            .catalog_repo
            .find_muscle_tests_by_ids(&ids)
            .await?
            .into_iter()
            .map(|muscle_test| {
                let pain_level = pain_by_test
                    .get(&muscle_test.id)
                    .copied()
                    .unwrap_or_default();
                RatedTest {
                    muscle_test,
                    pain_level,
                }
            })
            .collect();

        let session = self
            .generate_and_store(user_id, session, &body_part, rated)
            .await?;
        self.to_dto(user_id, session, &body_part).await
    }

    pub async fn get_session(&self, user_id: &str, session_id: &str) -> Result<SessionDto> {
        let session = self.find_owned(user_id, session_id).await?;
        let body_part = self.body_part_of(&session).await?;
        self.to_dto(user_id, session, &body_part).await
    }

    pub async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<()> {
        if !self.session_repo.delete(session_id, user_id).await? {
            return Err(AppError::NotFound("Session not found".to_string()));
        }
        tracing::info!(session_id, "Session deleted");
        Ok(())
    }

    /// Owner-scoped fetch; foreign sessions are reported as missing.
    pub async fn find_owned(&self, user_id: &str, session_id: &str) -> Result<Session> {
        self.session_repo
            .find_for_user(session_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    async fn body_part_of(&self, session: &Session) -> Result<BodyPart> {
        self.catalog_repo
            .find_body_part(&session.body_part_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Session {} references a missing body part", session.id))
            })
    }

    async fn generate_and_store(
        &self,
        user_id: &str,
        mut session: Session,
        body_part: &BodyPart,
        tests: Vec<RatedTest>,
    ) -> Result<Session> {
        let ids: Vec<String> = tests.iter().map(|t| t.muscle_test.id.clone()).collect();
        let exercises = self.catalog_repo.list_exercises_for_tests(&ids).await?;
        let request = PlanRequest {
            body_part: body_part.clone(),
            tests,
            exercises,
        };

        match self.plan_generator.generate(&request).await {
            Ok(plan) => {
                self.session_repo.set_plan(&session.id, &plan).await?;
                tracing::info!(
                    session_id = %session.id,
                    exercises = plan.exercises.len(),
                    "Training plan generated"
                );
                session.plan_status = PlanStatus::Generated;
                session.training_plan = Some(plan);
                Ok(session)
            }
            Err(e) => {
                tracing::error!(session_id = %session.id, "Training plan generation failed: {}", e);
                self.session_repo.mark_plan_failed(&session.id).await?;
                self.error_log_repo
                    .record(
                        Some(user_id),
                        PLAN_GENERATION_SOURCE,
                        &e.to_string(),
                        Some(json!({
                            "session_id": session.id,
                            "body_part_id": body_part.id,
                        })),
                    )
                    .await;
                match e {
                    AppError::Upstream(_) => Err(e),
                    other => Err(AppError::Upstream(other.to_string())),
                }
            }
        }
    }

    async fn to_dto(&self, user_id: &str, session: Session, body_part: &BodyPart) -> Result<SessionDto> {
        let tests = self.session_repo.find_tests(&session.id).await?;
        let feedback = self.feedback_repo.find(&session.id, user_id).await?;
        Ok(SessionDto {
            id: session.id,
            body_part: BodyPartRef::from(body_part),
            plan_status: session.plan_status,
            tests,
            training_plan: session.training_plan,
            feedback,
            created_at: session.created_at,
        })
    }
}

/// Every requested muscle test must exist and belong to the body part.
fn check_tests_belong(body_part: &BodyPart, requested: &[String], found: &[MuscleTest]) -> Result<()> {
    let by_id: HashMap<&str, &MuscleTest> = found.iter().map(|t| (t.id.as_str(), t)).collect();
    for id in requested {
        match by_id.get(id.as_str()) {
            None => {
                return Err(AppError::Validation(format!("Unknown muscle test: {}", id)));
            }
            Some(test) if test.body_part_id != body_part.id => {
                tracing::warn!(muscle_test = %id, body_part = %body_part.id, "Muscle test from another body part");
                return Err(AppError::Validation(format!(
                    "Muscle test {} does not belong to body part {}",
                    id, body_part.name
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}
