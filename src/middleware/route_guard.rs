use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::CurrentUser;
use crate::error::{AppError, Result};
use crate::repositories::{AuthSessionRepository, UserRepository};
use crate::session::get_session_token;

const LOGIN_PAGE: &str = "/login";
const HOME_PAGE: &str = "/";
const DISCLAIMER_PAGE: &str = "/disclaimer";

/// Reachable without signing in.
const PUBLIC_PATHS: &[&str] = &[
    "/login",
    "/register",
    "/health",
    "/api/auth/login",
    "/api/auth/register",
];

/// Pages that make no sense once signed in.
const GUEST_ONLY_PAGES: &[&str] = &["/login", "/register"];

/// Prefixes that require an accepted disclaimer, in addition to `/` itself.
const DISCLAIMER_GATED_PREFIXES: &[&str] = &["/sessions", "/api/sessions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pass,
    Redirect(&'static str),
    Unauthorized,
    DisclaimerRequired,
}

/// `prefix` itself or anything below it, segment-wise.
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn is_api(path: &str) -> bool {
    path_has_prefix(path, "/api")
}

fn requires_disclaimer(path: &str) -> bool {
    path == HOME_PAGE
        || DISCLAIMER_GATED_PREFIXES
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
}

/// Route protection rules, evaluated in order.
pub fn decide(method: &Method, path: &str, user: Option<&CurrentUser>) -> Decision {
    let api = is_api(path);

    let Some(user) = user else {
        if PUBLIC_PATHS.contains(&path) {
            return Decision::Pass;
        }
        return if api {
            Decision::Unauthorized
        } else {
            Decision::Redirect(LOGIN_PAGE)
        };
    };

    if GUEST_ONLY_PAGES.contains(&path) {
        return Decision::Redirect(HOME_PAGE);
    }

    if !user.has_accepted_disclaimer() && requires_disclaimer(path) {
        return if api {
            Decision::DisclaimerRequired
        } else {
            Decision::Redirect(DISCLAIMER_PAGE)
        };
    }

    if user.has_accepted_disclaimer() && path == DISCLAIMER_PAGE && *method == Method::GET {
        return Decision::Redirect(HOME_PAGE);
    }

    Decision::Pass
}

#[derive(Clone)]
pub struct GuardState {
    pub user_repo: UserRepository,
    pub auth_session_repo: AuthSessionRepository,
}

async fn resolve_user(state: &GuardState, jar: &CookieJar) -> Result<Option<CurrentUser>> {
    let Some(token) = get_session_token(jar) else {
        return Ok(None);
    };
    let Some(user_id) = state.auth_session_repo.find_valid(&token).await? else {
        return Ok(None);
    };
    Ok(state.user_repo.find_by_id(&user_id).await?.map(CurrentUser::from))
}

/// Resolves the session cookie into a [`CurrentUser`] extension and applies
/// [`decide`] before the request reaches a handler.
pub async fn route_guard(
    State(state): State<GuardState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let user = match resolve_user(&state, &jar).await {
        Ok(user) => user,
        // Public paths stay reachable when the cookie cannot be checked.
        Err(e) if PUBLIC_PATHS.contains(&path.as_str()) => {
            tracing::warn!(path = %path, "Treating request as anonymous, session lookup failed: {}", e);
            None
        }
        Err(e) => return e.into_response(),
    };

    match decide(req.method(), &path, user.as_ref()) {
        Decision::Pass => {
            if let Some(user) = user {
                req.extensions_mut().insert(user);
            }
            next.run(req).await
        }
        Decision::Redirect(to) => {
            tracing::debug!(from = %path, to, "Route guard redirect");
            Redirect::to(to).into_response()
        }
        Decision::Unauthorized => AppError::Unauthorized.into_response(),
        Decision::DisclaimerRequired => {
            AppError::Forbidden("The disclaimer must be accepted first".to_string()).into_response()
        }
    }
}
