mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

async fn setup() -> (axum::Router, String, String) {
    let pool = common::setup_test_db();
    let user = common::create_ready_user(&pool, "jo@example.com").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/sessions",
            Some(&cookie),
            common::knee_assessment(),
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    let session_id = body["id"].as_str().unwrap().to_string();
    (app, cookie, session_id)
}

#[tokio::test]
async fn test_submit_feedback_and_replace_it() {
    let (app, cookie, session_id) = setup().await;
    let uri = format!("/api/sessions/{}/feedback", session_id);

    let response = app
        .clone()
        .oneshot(common::get_request(&uri, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            &uri,
            Some(&cookie),
            json!({ "rating": 4, "comment": "  Helpful  " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = common::body_json(response).await;
    assert_eq!(first["rating"], 4);
    assert_eq!(first["comment"], "Helpful");

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            &uri,
            Some(&cookie),
            json!({ "rating": 2, "comment": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = common::body_json(response).await;
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["rating"], 2);
    assert!(second["comment"].is_null());
    assert_eq!(second["created_at"], first["created_at"]);

    let response = app
        .clone()
        .oneshot(common::get_request(&uri, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stored = common::body_json(response).await;
    assert_eq!(stored["rating"], 2);

    // The session view carries the rating too.
    let response = app
        .oneshot(common::get_request(
            &format!("/api/sessions/{}", session_id),
            Some(&cookie),
        ))
        .await
        .unwrap();
    let session = common::body_json(response).await;
    assert_eq!(session["feedback"]["rating"], 2);
}

#[tokio::test]
async fn test_feedback_rating_out_of_range() {
    let (app, cookie, session_id) = setup().await;
    let uri = format!("/api/sessions/{}/feedback", session_id);

    for rating in [0, 6] {
        let response = app
            .clone()
            .oneshot(common::json_request(
                "POST",
                &uri,
                Some(&cookie),
                json!({ "rating": rating }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", rating);
    }
}

#[tokio::test]
async fn test_feedback_on_unknown_session_is_not_found() {
    let (app, cookie, _) = setup().await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/sessions/missing/feedback",
            Some(&cookie),
            json!({ "rating": 3 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feedback_on_other_users_session_is_not_found() {
    let pool = common::setup_test_db();
    let owner = common::create_ready_user(&pool, "owner@example.com").await;
    let other = common::create_ready_user(&pool, "other@example.com").await;
    let owner_cookie = common::create_session_cookie(&pool, &owner).await;
    let other_cookie = common::create_session_cookie(&pool, &other).await;
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/sessions",
            Some(&owner_cookie),
            common::knee_assessment(),
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    let uri = format!("/api/sessions/{}/feedback", body["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            &uri,
            Some(&owner_cookie),
            json!({ "rating": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            &uri,
            Some(&other_cookie),
            json!({ "rating": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(common::get_request(&uri, Some(&other_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner's rating is untouched.
    let response = app
        .oneshot(common::get_request(&uri, Some(&owner_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stored = common::body_json(response).await;
    assert_eq!(stored["rating"], 5);
}
