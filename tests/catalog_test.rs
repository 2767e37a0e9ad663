mod common;

use axum::http::StatusCode;
use tower::ServiceExt;

#[tokio::test]
async fn test_list_body_parts_in_display_order() {
    let pool = common::setup_test_db();
    let user = common::create_ready_user(&pool, "jo@example.com").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::get_request("/api/body_parts", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        ["bp-neck", "bp-shoulder", "bp-lower-back", "bp-hip", "bp-knee", "bp-ankle"]
    );
}

#[tokio::test]
async fn test_list_muscle_tests_for_body_part() {
    let pool = common::setup_test_db();
    let user = common::create_ready_user(&pool, "jo@example.com").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::get_request(
            "/api/body_parts/bp-knee/muscle_tests",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let tests = body.as_array().unwrap();
    assert_eq!(tests.len(), 2);
    assert_eq!(tests[0]["id"], "mt-knee-squat");
    assert_eq!(tests[1]["id"], "mt-knee-step-down");
    assert!(tests.iter().all(|t| t["body_part_id"] == "bp-knee"));
}

#[tokio::test]
async fn test_unknown_body_part_is_not_found() {
    let pool = common::setup_test_db();
    let user = common::create_ready_user(&pool, "jo@example.com").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::get_request(
            "/api/body_parts/bp-elbow/muscle_tests",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
