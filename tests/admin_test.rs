mod common;

use axum::http::StatusCode;
use physiotrack::models::UserRole;
use physiotrack::repositories::ErrorLogRepository;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_error_logs_require_admin() {
    let pool = common::setup_test_db();
    let user = common::create_ready_user(&pool, "jo@example.com").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::get_request("/api/admin/error_logs", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Admin access required");
}

#[tokio::test]
async fn test_admin_lists_recent_error_logs() {
    let pool = common::setup_test_db();
    let admin = common::create_test_user(&pool, "admin@example.com", UserRole::Admin).await;
    let cookie = common::create_session_cookie(&pool, &admin).await;

    let error_log_repo = ErrorLogRepository::new(pool.clone());
    error_log_repo
        .insert(None, "plan_generation", "first", None)
        .await
        .unwrap();
    error_log_repo
        .insert(
            Some(&admin.id),
            "plan_generation",
            "second",
            Some(json!({ "session_id": "s1" })),
        )
        .await
        .unwrap();

    let app = common::create_test_app(pool);
    let response = app
        .oneshot(common::get_request("/api/admin/error_logs", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let logs = body.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["message"], "second");
    assert_eq!(logs[0]["context"]["session_id"], "s1");
    assert_eq!(logs[1]["message"], "first");
    assert!(logs[1]["user_id"].is_null());
}
