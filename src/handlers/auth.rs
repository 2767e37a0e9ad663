use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{Credentials, User, UserDto};
use crate::repositories::{AuthSessionRepository, UserRepository};
use crate::session::{create_session_cookie, get_session_token, remove_session_cookie};

#[derive(Clone)]
pub struct AuthState {
    pub user_repo: UserRepository,
    pub auth_session_repo: AuthSessionRepository,
    pub cookie_secure: bool,
    pub session_ttl_days: i64,
}

impl AuthState {
    /// Open an auth session for `user` and attach its cookie to the jar.
    pub async fn sign_in(&self, jar: CookieJar, user: &User) -> Result<CookieJar> {
        let token = self
            .auth_session_repo
            .create(&user.id, self.session_ttl_days)
            .await?;
        tracing::info!(user_id = %user.id, "User signed in");
        Ok(jar.add(create_session_cookie(
            &token,
            self.cookie_secure,
            self.session_ttl_days,
        )))
    }

    /// Drop the auth session behind the cookie, if any, and clear the cookie.
    pub async fn sign_out(&self, jar: CookieJar) -> Result<CookieJar> {
        if let Some(token) = get_session_token(&jar) {
            self.auth_session_repo.delete(&token).await?;
        }
        Ok(jar.add(remove_session_cookie()))
    }

    /// Validate and create an account. The first account becomes admin.
    pub async fn register(&self, credentials: &Credentials) -> Result<User> {
        credentials
            .validate_for_registration()
            .map_err(AppError::Validation)?;
        let user = self
            .user_repo
            .register(&credentials.normalized_email(), &credentials.password)
            .await?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");
        Ok(user)
    }
}

pub async fn register(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<Response> {
    let user = state.register(&credentials).await?;
    let jar = state.sign_in(jar, &user).await?;
    Ok((jar, (StatusCode::CREATED, Json(UserDto::from(user)))).into_response())
}

pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<Response> {
    let user = state
        .user_repo
        .verify_password(&credentials.email, &credentials.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let jar = state.sign_in(jar, &user).await?;
    Ok((jar, Json(UserDto::from(user))).into_response())
}

pub async fn logout(
    State(state): State<AuthState>,
    _auth_user: AuthUser,
    jar: CookieJar,
) -> Result<Response> {
    let jar = state.sign_out(jar).await?;
    Ok((jar, StatusCode::NO_CONTENT).into_response())
}

pub async fn me(State(state): State<AuthState>, auth_user: AuthUser) -> Result<Json<UserDto>> {
    let user = state
        .user_repo
        .find_by_id(&auth_user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(UserDto::from(user)))
}
