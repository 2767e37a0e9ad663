use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::DbPool;
use crate::handlers::{admin, auth, catalog, disclaimer, feedback, health, pages, sessions};
use crate::llm::PlanGenerator;
use crate::middleware::{route_guard, GuardState};
use crate::repositories::{
    AuthSessionRepository, CatalogRepository, ErrorLogRepository, FeedbackRepository,
    SessionRepository, UserRepository,
};
use crate::services::SessionService;

/// Handler states for every route group, built from one pool.
#[derive(Clone)]
pub struct AppStates {
    pub pool: DbPool,
    pub auth: auth::AuthState,
    pub disclaimer: disclaimer::DisclaimerState,
    pub catalog: catalog::CatalogState,
    pub sessions: sessions::SessionsState,
    pub feedback: feedback::FeedbackState,
    pub admin: admin::AdminState,
    pub pages: pages::PagesState,
    pub guard: GuardState,
}

impl AppStates {
    pub fn new(pool: DbPool, config: &Config, plan_generator: Arc<dyn PlanGenerator>) -> Self {
        // Create repositories
        let user_repo = UserRepository::new(pool.clone());
        let auth_session_repo = AuthSessionRepository::new(pool.clone());
        let catalog_repo = CatalogRepository::new(pool.clone());
        let session_repo = SessionRepository::new(pool.clone());
        let feedback_repo = FeedbackRepository::new(pool.clone());
        let error_log_repo = ErrorLogRepository::new(pool.clone());

        let session_service = SessionService {
            catalog_repo: catalog_repo.clone(),
            session_repo: session_repo.clone(),
            feedback_repo: feedback_repo.clone(),
            error_log_repo: error_log_repo.clone(),
            plan_generator,
        };

        let auth = auth::AuthState {
            user_repo: user_repo.clone(),
            auth_session_repo: auth_session_repo.clone(),
            cookie_secure: config.cookie_secure,
            session_ttl_days: config.session_ttl_days,
        };

        Self {
            pool,
            disclaimer: disclaimer::DisclaimerState {
                catalog_repo: catalog_repo.clone(),
                user_repo: user_repo.clone(),
            },
            catalog: catalog::CatalogState {
                catalog_repo: catalog_repo.clone(),
            },
            sessions: sessions::SessionsState {
                session_service: session_service.clone(),
                session_repo: session_repo.clone(),
            },
            feedback: feedback::FeedbackState {
                session_service: session_service.clone(),
                feedback_repo,
            },
            admin: admin::AdminState { error_log_repo },
            pages: pages::PagesState {
                auth: auth.clone(),
                catalog_repo,
                session_repo,
                session_service,
            },
            guard: GuardState {
                user_repo,
                auth_session_repo,
            },
            auth,
        }
    }
}

pub fn create_router(states: AppStates) -> Router {
    let AppStates {
        pool,
        auth: auth_state,
        disclaimer: disclaimer_state,
        catalog: catalog_state,
        sessions: sessions_state,
        feedback: feedback_state,
        admin: admin_state,
        pages: pages_state,
        guard: guard_state,
    } = states;

    Router::new()
        // Pages
        .route("/", get(pages::dashboard))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route(
            "/register",
            get(pages::register_page).post(pages::register_submit),
        )
        .route("/logout", post(pages::logout))
        .route(
            "/disclaimer",
            get(pages::disclaimer_page).post(pages::disclaimer_accept),
        )
        .route("/sessions/{id}", get(pages::session_detail))
        .with_state(pages_state)
        // Auth API
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .with_state(auth_state)
        // Disclaimer API
        .route("/api/disclaimer", get(disclaimer::show))
        .route("/api/disclaimer/accept", post(disclaimer::accept))
        .with_state(disclaimer_state)
        // Catalog API
        .route("/api/body_parts", get(catalog::list_body_parts))
        .route(
            "/api/body_parts/{id}/muscle_tests",
            get(catalog::list_muscle_tests),
        )
        .with_state(catalog_state)
        // Sessions API
        .route("/api/sessions", get(sessions::list).post(sessions::create))
        .route(
            "/api/sessions/{id}",
            get(sessions::show).delete(sessions::delete),
        )
        .route("/api/sessions/{id}/plan", post(sessions::regenerate_plan))
        .with_state(sessions_state)
        // Feedback API
        .route(
            "/api/sessions/{id}/feedback",
            get(feedback::show).post(feedback::submit),
        )
        .with_state(feedback_state)
        // Admin API
        .route("/api/admin/error_logs", get(admin::error_logs))
        .with_state(admin_state)
        // Health
        .route("/health", get(health::health_check))
        .with_state(pool)
        .layer(middleware::from_fn_with_state(guard_state, route_guard))
        .layer(TraceLayer::new_for_http())
}
