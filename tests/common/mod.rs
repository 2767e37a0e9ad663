#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;

use physiotrack::config::{Config, LlmConfig};
use physiotrack::db::{create_memory_pool, DbPool};
use physiotrack::error::{AppError, Result};
use physiotrack::llm::{PlanGenerator, PlanRequest};
use physiotrack::migrations::run_migrations_for_tests;
use physiotrack::models::{PlannedExercise, TrainingPlan, User, UserRole};
use physiotrack::repositories::{AuthSessionRepository, UserRepository};
use physiotrack::routes::{create_router, AppStates};

pub const PASSWORD: &str = "password123";

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn test_config() -> Config {
    Config {
        database_url: ":memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cookie_secure: false,
        session_ttl_days: 7,
        llm: LlmConfig::default(),
    }
}

/// Plan generator that answers from memory and counts its calls.
pub struct StubPlanGenerator {
    fail: bool,
    calls: AtomicUsize,
}

impl StubPlanGenerator {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanGenerator for StubPlanGenerator {
    async fn generate(&self, request: &PlanRequest) -> Result<TrainingPlan> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Upstream("stub provider is down".to_string()));
        }

        Ok(TrainingPlan {
            title: format!("{} plan", request.body_part.name),
            summary: format!("{} tests rated", request.tests.len()),
            exercises: request
                .exercises
                .iter()
                .map(|exercise| PlannedExercise {
                    exercise_id: Some(exercise.id.clone()),
                    name: exercise.name.clone(),
                    sets: Some(3),
                    reps: Some("10".to_string()),
                    frequency: Some("daily".to_string()),
                    notes: None,
                })
                .collect(),
            precautions: vec!["Stop if pain increases".to_string()],
        })
    }
}

pub fn create_test_app(pool: DbPool) -> Router {
    create_test_app_with_generator(pool, StubPlanGenerator::succeeding())
}

pub fn create_test_app_with_generator(pool: DbPool, generator: Arc<StubPlanGenerator>) -> Router {
    create_router(AppStates::new(pool, &test_config(), generator))
}

pub async fn create_test_user(pool: &DbPool, email: &str, role: UserRole) -> User {
    let user_repo = UserRepository::new(pool.clone());
    user_repo.create(email, PASSWORD, role).await.unwrap()
}

/// A regular user who already accepted the disclaimer.
pub async fn create_ready_user(pool: &DbPool, email: &str) -> User {
    let user = create_test_user(pool, email, UserRole::User).await;
    accept_disclaimer(pool, &user).await;
    user
}

pub async fn accept_disclaimer(pool: &DbPool, user: &User) {
    let user_repo = UserRepository::new(pool.clone());
    user_repo.accept_disclaimer(&user.id).await.unwrap();
}

pub async fn create_session_cookie(pool: &DbPool, user: &User) -> String {
    let auth_session_repo = AuthSessionRepository::new(pool.clone());
    let token = auth_session_repo.create(&user.id, 7).await.unwrap();
    format!("session={}", token)
}

pub fn extract_cookie_header(set_cookie: &str) -> String {
    // Extract just the cookie name=value part for use in Cookie header
    set_cookie.split(';').next().unwrap_or("").to_string()
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    empty_request("GET", uri, cookie)
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn form_request(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Knee assessment with both seeded knee tests rated.
pub fn knee_assessment() -> Value {
    serde_json::json!({
        "body_part_id": "bp-knee",
        "tests": [
            { "muscle_test_id": "mt-knee-squat", "pain_level": 6 },
            { "muscle_test_id": "mt-knee-step-down", "pain_level": 3 }
        ]
    })
}
