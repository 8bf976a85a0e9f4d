mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, create_test_app, get, post_json, stat, LEARNER};

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_health_live() {
    let (app, _) = create_test_app();

    let response = app.oneshot(get("/health/live", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let (app, _) = create_test_app();

    let response = app.oneshot(get("/api/nope", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_materials_anonymous() {
    let (app, _) = create_test_app();

    let response = app.oneshot(get("/api/materials", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let materials = body["data"].as_array().unwrap();
    assert_eq!(materials.len(), 2);
    assert_eq!(materials[0]["id"], "m1");
    assert_eq!(materials[0]["unitCount"], 3);
    assert_eq!(materials[0]["questionCount"], 3);
    assert_eq!(materials[0]["nextUnitId"], "u1");
    assert_eq!(materials[1]["nextUnitId"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_invalid_token_is_treated_as_anonymous() {
    let (app, _) = create_test_app();

    let request = Request::builder()
        .uri("/api/materials")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_material_detail_uses_account_progress() {
    let (app, store) = create_test_app();
    store.put_statistic(stat("q1", 1, 1, None));
    store.put_statistic(stat("q2", 2, 1, None));

    let response = app
        .oneshot(get("/api/materials/m1", Some(LEARNER)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["nextUnitId"], "u3");
    assert_eq!(data["chapters"][0]["id"], "c1");
    assert_eq!(data["chapters"][0]["units"][0]["solvedQuestionCount"], 2);
    assert_eq!(data["chapters"][0]["units"][1]["questionCount"], 0);
}

#[tokio::test]
async fn test_material_detail_not_found() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(get("/api/materials/missing", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_totals() {
    let (app, store) = create_test_app();
    store.put_statistic(stat("q3", 1, 1, None));

    let response = app
        .oneshot(get("/api/dashboard", Some(LEARNER)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["materialCount"], 2);
    assert_eq!(body["data"]["totalQuestionCount"], 3);
    assert_eq!(body["data"]["solvedQuestionCount"], 1);
}

#[tokio::test]
async fn test_review_requires_account() {
    let (app, _) = create_test_app();

    let response = app.oneshot(get("/api/review", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_review_data_with_unknown_material_selects_first() {
    let (app, store) = create_test_app();
    store.put_statistic(stat("q1", 5, 2, None));

    let response = app
        .oneshot(get("/api/review?materialId=missing", Some(LEARNER)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["selectedMaterialId"], "m1");
    assert_eq!(data["thresholds"]["weakAccuracy"], 0.6);
    assert_eq!(data["thresholds"]["lowAttempt"], 3);
    assert_eq!(data["groups"]["weak"][0]["questionId"], "q1");
    assert_eq!(data["materials"][0]["weakCount"], 1);
    assert_eq!(data["materials"][0]["unattemptedCount"], 2);
    assert_eq!(data["materials"][1]["totalQuestionCount"], 0);
}

#[tokio::test]
async fn test_review_session_returns_answers() {
    let (app, store) = create_test_app();
    store.put_statistic(stat("q1", 1, 1, None));

    let response = app
        .oneshot(get(
            "/api/review/session?materialId=m1&group=lowAttempts",
            Some(LEARNER),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["group"], "lowAttempts");
    assert_eq!(data["material"]["name"], "Basics");
    assert_eq!(data["questions"][0]["questionId"], "q1");
    assert_eq!(data["questions"][0]["hint"], "hint q1");
    assert_eq!(data["questions"][0]["acceptableAnswers"], json!(["first", "second"]));
}

#[tokio::test]
async fn test_review_session_rejects_unknown_group() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(get(
            "/api/review/session?materialId=m1&group=hardest",
            Some(LEARNER),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_review_session_requires_material_id() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(get("/api/review/session?group=weak", Some(LEARNER)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_review_session_unknown_material() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(get(
            "/api/review/session?materialId=missing&group=weak",
            Some(LEARNER),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_attempt_requires_account() {
    let (app, store) = create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/questions/q1/attempts",
            None,
            json!({ "isCorrect": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.statistic(LEARNER, "q1").is_none());
}

#[tokio::test]
async fn test_record_attempt_updates_counters() {
    let (app, store) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/questions/q1/attempts",
            Some(LEARNER),
            json!({ "isCorrect": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_json(
            "/api/questions/q1/attempts",
            Some(LEARNER),
            json!({ "isCorrect": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["totalAttempts"], 2);
    assert_eq!(body["data"]["correctCount"], 1);
    assert_eq!(body["data"]["incorrectCount"], 1);
    assert_eq!(body["data"]["accuracy"], 0.5);

    let stored = store.statistic(LEARNER, "q1").unwrap();
    assert_eq!(stored.total_attempts, 2);
}

#[tokio::test]
async fn test_record_attempt_unknown_question() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/questions/missing/attempts",
            Some(LEARNER),
            json!({ "isCorrect": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unit_session_orders_questions() {
    let (app, store) = create_test_app();
    store.put_statistic(stat("q2", 3, 0, None));

    let response = app
        .oneshot(get("/api/units/u1/session", Some(LEARNER)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let questions = body["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["id"], "q1");
    assert_eq!(questions[0]["acceptableAnswers"], json!(["first", "second"]));
    assert_eq!(questions[0]["statistic"]["totalAttempts"], 0);
    assert_eq!(questions[1]["statistic"]["incorrectCount"], 3);
}

#[tokio::test]
async fn test_unit_session_not_found() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(get("/api/units/missing/session", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
