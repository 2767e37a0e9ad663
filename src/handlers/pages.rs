use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;

use super::auth::AuthState;
use crate::error::{AppError, Result};
use crate::middleware::{AuthUser, CurrentUser};
use crate::models::{BodyPart, Credentials, Disclaimer, SessionDto, SessionSummary};
use crate::repositories::{CatalogRepository, SessionRepository};
use crate::services::SessionService;

const RECENT_SESSIONS: i64 = 5;

#[derive(Clone)]
pub struct PagesState {
    pub auth: AuthState,
    pub catalog_repo: CatalogRepository,
    pub session_repo: SessionRepository,
    pub session_service: SessionService,
}

// Templates
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    email: String,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "auth/register.html")]
struct RegisterTemplate {
    email: String,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "disclaimer.html")]
struct DisclaimerTemplate {
    user: CurrentUser,
    disclaimer: Disclaimer,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    user: CurrentUser,
    body_parts: Vec<BodyPart>,
    recent_sessions: Vec<SessionSummary>,
}

#[derive(Template)]
#[template(path = "sessions/show.html")]
struct SessionTemplate {
    user: CurrentUser,
    session: SessionDto,
}

fn render<T: Template>(template: T) -> Result<Response> {
    Ok(Html(template.render()?).into_response())
}

// Handlers
pub async fn login_page() -> Result<Response> {
    render(LoginTemplate {
        email: String::new(),
        error: None,
    })
}

pub async fn login_submit(
    State(state): State<PagesState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> Result<Response> {
    let user = state
        .auth
        .user_repo
        .verify_password(&credentials.email, &credentials.password)
        .await?;

    match user {
        Some(user) => {
            let jar = state.auth.sign_in(jar, &user).await?;
            Ok((jar, Redirect::to("/")).into_response())
        }
        None => render(LoginTemplate {
            email: credentials.email,
            error: Some("Invalid email or password".to_string()),
        }),
    }
}

pub async fn register_page() -> Result<Response> {
    render(RegisterTemplate {
        email: String::new(),
        error: None,
    })
}

pub async fn register_submit(
    State(state): State<PagesState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> Result<Response> {
    match state.auth.register(&credentials).await {
        Ok(user) => {
            let jar = state.auth.sign_in(jar, &user).await?;
            Ok((jar, Redirect::to("/disclaimer")).into_response())
        }
        Err(AppError::Validation(message)) | Err(AppError::Conflict(message)) => {
            render(RegisterTemplate {
                email: credentials.email,
                error: Some(message),
            })
        }
        Err(e) => Err(e),
    }
}

pub async fn logout(State(state): State<PagesState>, jar: CookieJar) -> Result<Response> {
    let jar = state.auth.sign_out(jar).await?;
    Ok((jar, Redirect::to("/login")).into_response())
}

pub async fn disclaimer_page(
    State(state): State<PagesState>,
    AuthUser(user): AuthUser,
) -> Result<Response> {
    let disclaimer = state
        .catalog_repo
        .current_disclaimer()
        .await?
        .ok_or_else(|| AppError::NotFound("No disclaimer configured".to_string()))?;

    render(DisclaimerTemplate { user, disclaimer })
}

pub async fn disclaimer_accept(
    State(state): State<PagesState>,
    auth_user: AuthUser,
) -> Result<Response> {
    state.auth.user_repo.accept_disclaimer(&auth_user.id).await?;
    Ok(Redirect::to("/").into_response())
}

pub async fn dashboard(
    State(state): State<PagesState>,
    AuthUser(user): AuthUser,
) -> Result<Response> {
    let body_parts = state.catalog_repo.list_body_parts().await?;
    let recent_sessions = state
        .session_repo
        .list_for_user(&user.id, RECENT_SESSIONS, 0)
        .await?;

    render(DashboardTemplate {
        user,
        body_parts,
        recent_sessions,
    })
}

pub async fn session_detail(
    State(state): State<PagesState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let session = state.session_service.get_session(&user.id, &id).await?;
    render(SessionTemplate { user, session })
}
