mod common;

use axum::http::{header, StatusCode};
use physiotrack::models::UserRole;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_register_first_user_becomes_admin() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "email": "First@Example.com", "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));

    let body = common::body_json(response).await;
    assert_eq!(body["email"], "first@example.com");
    assert_eq!(body["role"], "admin");
    assert!(body["disclaimer_accepted_at"].is_null());

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "email": "second@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "email": "not-an-email", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "email": "jo@example.com", "password": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("at least 8"));
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "jo@example.com", UserRole::User).await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "email": "JO@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_then_me_then_logout() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "jo@example.com", UserRole::User).await;
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "jo@example.com", "password": common::PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    let cookie = common::extract_cookie_header(set_cookie);

    let response = app
        .clone()
        .oneshot(common::get_request("/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["email"], "jo@example.com");
    assert!(body.get("password_hash").is_none());

    let response = app
        .clone()
        .oneshot(common::empty_request("POST", "/api/auth/logout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The token is gone server-side even if the client keeps sending it.
    let response = app
        .oneshot(common::get_request("/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "jo@example.com", UserRole::User).await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "jo@example.com", "password": "wrongpassword" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_garbage_cookie_is_unauthorized() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::get_request("/api/auth/me", Some("session=nope")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_login_page_form_flow() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "jo@example.com", UserRole::User).await;
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(common::get_request("/login", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_text(response).await;
    assert!(html.contains("action=\"/login\""));

    let response = app
        .clone()
        .oneshot(common::form_request(
            "/login",
            None,
            "email=jo%40example.com&password=wrongpassword",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_text(response).await;
    assert!(html.contains("Invalid email or password"));

    let response = app
        .oneshot(common::form_request(
            "/login",
            None,
            "email=jo%40example.com&password=password123",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/");
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn test_register_page_sends_new_user_to_disclaimer() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(common::form_request(
            "/register",
            None,
            "email=new%40example.com&password=password123",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/disclaimer");
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    let cookie = common::extract_cookie_header(set_cookie);

    let response = app
        .oneshot(common::get_request("/disclaimer", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_text(response).await;
    assert!(html.contains("action=\"/disclaimer\""));
}

#[tokio::test]
async fn test_register_page_rerenders_on_duplicate() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "jo@example.com", UserRole::User).await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::form_request(
            "/register",
            None,
            "email=jo%40example.com&password=password123",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_text(response).await;
    assert!(html.contains("Email is already registered"));
}

#[tokio::test]
async fn test_page_logout_clears_cookie() {
    let pool = common::setup_test_db();
    let user = common::create_ready_user(&pool, "jo@example.com").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(common::empty_request("POST", "/logout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login");

    let response = app
        .oneshot(common::get_request("/", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login");
}
