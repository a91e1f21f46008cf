mod common;

use axum::{http::StatusCode, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{body_json, json_request};
use fittrack::db::DbPool;
use fittrack::repositories::ExerciseRepository;

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(method, uri, Some(token), body))
        .await
        .unwrap();
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return (status, Value::Null);
    }
    (status, body_json(response).await)
}

async fn seed_exercise(pool: &DbPool, group: &str, name: &str) -> i64 {
    let repo = ExerciseRepository::new(pool.clone());
    let group = repo.create_muscle_group(group).await.unwrap();
    repo.create(name, group.id, None).await.unwrap().id
}

#[tokio::test]
async fn test_sessions_require_auth() {
    let app = common::create_test_app(common::setup_test_db());

    let response = app
        .oneshot(json_request("GET", "/api/sessions/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_session_defaults() {
    let pool = common::setup_test_db();
    let (_, token) = common::create_logged_in_user(&pool, "a@example.com").await;
    let app = common::create_test_app(pool);

    let (status, session) = call(&app, "POST", "/api/sessions/", &token, Some(json!({ "date": "2025-06-02" }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["date"], "2025-06-02");
    assert_eq!(session["notes"], "");
    assert_eq!(session["completed"], false);
    assert_eq!(session["session_entries"], json!([]));
}

#[tokio::test]
async fn test_list_sessions_by_date_range() {
    let pool = common::setup_test_db();
    let (_, token) = common::create_logged_in_user(&pool, "a@example.com").await;
    let app = common::create_test_app(pool);

    for date in ["2025-06-01", "2025-06-02", "2025-06-08", "2025-06-09"] {
        call(&app, "POST", "/api/sessions/", &token, Some(json!({ "date": date }))).await;
    }

    let (status, sessions) = call(
        &app,
        "GET",
        "/api/sessions/?date_from=2025-06-02&date_to=2025-06-08",
        &token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let dates: Vec<_> = sessions
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2025-06-02", "2025-06-08"]);
}

#[tokio::test]
async fn test_sessions_are_private() {
    let pool = common::setup_test_db();
    let (_, owner) = common::create_logged_in_user(&pool, "owner@example.com").await;
    let (_, other) = common::create_logged_in_user(&pool, "other@example.com").await;
    let app = common::create_test_app(pool);

    let (_, session) = call(&app, "POST", "/api/sessions/", &owner, Some(json!({ "date": "2025-06-02" }))).await;
    let uri = format!("/api/sessions/{}/", session["id"]);

    let (list_status, listed) = call(&app, "GET", "/api/sessions/", &other, None).await;
    let (show_status, _) = call(&app, "GET", &uri, &other, None).await;
    let (delete_status, _) = call(&app, "DELETE", &uri, &other, None).await;

    assert_eq!(list_status, StatusCode::OK);
    assert_eq!(listed, json!([]));
    assert_eq!(show_status, StatusCode::NOT_FOUND);
    assert_eq!(delete_status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_session() {
    let pool = common::setup_test_db();
    let (_, token) = common::create_logged_in_user(&pool, "a@example.com").await;
    let app = common::create_test_app(pool);

    let (_, session) = call(&app, "POST", "/api/sessions/", &token, Some(json!({ "date": "2025-06-02", "notes": "legs" }))).await;
    let uri = format!("/api/sessions/{}/", session["id"]);

    let (status, updated) = call(&app, "PATCH", &uri, &token, Some(json!({ "completed": true }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["notes"], "legs");

    let (_, completed) = call(&app, "GET", "/api/sessions/?completed=true", &token, None).await;
    assert_eq!(completed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_and_delete_entry() {
    let pool = common::setup_test_db();
    let (_, token) = common::create_logged_in_user(&pool, "a@example.com").await;
    let bench = seed_exercise(&pool, "Chest", "Bench Press").await;
    let app = common::create_test_app(pool);

    let (_, session) = call(&app, "POST", "/api/sessions/", &token, Some(json!({ "date": "2025-06-02" }))).await;
    let (status, entry) = call(
        &app,
        "POST",
        "/api/session-entries/",
        &token,
        Some(json!({ "session": session["id"], "exercise": bench, "weight": "60kg", "status": "Static" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["weight"], "60kg");
    assert_eq!(entry["status"], "Static");
    assert_eq!(entry["exercise"]["muscle_group"]["muscle_group_name"], "Chest");

    let session_uri = format!("/api/sessions/{}/", session["id"]);
    let (_, fetched) = call(&app, "GET", &session_uri, &token, None).await;
    assert_eq!(fetched["session_entries"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "DELETE", &format!("/api/session-entries/{}/", entry["id"]), &token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = call(&app, "GET", &session_uri, &token, None).await;
    assert_eq!(fetched["session_entries"], json!([]));
}

#[tokio::test]
async fn test_entry_validation() {
    let pool = common::setup_test_db();
    let (_, token) = common::create_logged_in_user(&pool, "a@example.com").await;
    let bench = seed_exercise(&pool, "Chest", "Bench Press").await;
    let app = common::create_test_app(pool);

    let (_, session) = call(&app, "POST", "/api/sessions/", &token, Some(json!({ "date": "2025-06-02" }))).await;
    let entry = |exercise: i64, weight: &str| {
        Some(json!({ "session": session["id"], "exercise": exercise, "weight": weight }))
    };

    let (blank_weight, _) = call(&app, "POST", "/api/session-entries/", &token, entry(bench, " ")).await;
    let (unknown_exercise, _) = call(&app, "POST", "/api/session-entries/", &token, entry(999, "10kg")).await;
    let (first, _) = call(&app, "POST", "/api/session-entries/", &token, entry(bench, "10kg")).await;
    let (duplicate, _) = call(&app, "POST", "/api/session-entries/", &token, entry(bench, "12kg")).await;
    let (unknown_session, _) = call(
        &app,
        "POST",
        "/api/session-entries/",
        &token,
        Some(json!({ "session": 999, "exercise": bench, "weight": "10kg" })),
    )
    .await;

    assert_eq!(blank_weight, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_exercise, StatusCode::BAD_REQUEST);
    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(duplicate, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_session, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session_removes_entries() {
    let pool = common::setup_test_db();
    let (_, token) = common::create_logged_in_user(&pool, "a@example.com").await;
    let bench = seed_exercise(&pool, "Chest", "Bench Press").await;
    let app = common::create_test_app(pool);

    let (_, session) = call(&app, "POST", "/api/sessions/", &token, Some(json!({ "date": "2025-06-02" }))).await;
    let (_, entry) = call(
        &app,
        "POST",
        "/api/session-entries/",
        &token,
        Some(json!({ "session": session["id"], "exercise": bench, "weight": "60kg" })),
    )
    .await;

    let (status, _) = call(&app, "DELETE", &format!("/api/sessions/{}/", session["id"]), &token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, "DELETE", &format!("/api/session-entries/{}/", entry["id"]), &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter_by_muscle_group() {
    let pool = common::setup_test_db();
    let (_, token) = common::create_logged_in_user(&pool, "a@example.com").await;
    let bench = seed_exercise(&pool, "Chest", "Bench Press").await;
    let squat = seed_exercise(&pool, "Legs", "Squat").await;
    let app = common::create_test_app(pool);

    for (date, exercise) in [("2025-06-02", bench), ("2025-06-03", squat)] {
        let (_, session) = call(&app, "POST", "/api/sessions/", &token, Some(json!({ "date": date }))).await;
        call(
            &app,
            "POST",
            "/api/session-entries/",
            &token,
            Some(json!({ "session": session["id"], "exercise": exercise, "weight": "50kg" })),
        )
        .await;
    }

    let (_, legs) = call(&app, "GET", "/api/muscle-groups/", &token, None).await;
    let legs_id = legs
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["muscle_group_name"] == "Legs")
        .unwrap()["id"]
        .clone();

    let (_, sessions) = call(&app, "GET", &format!("/api/sessions/?muscle_group_id={}", legs_id), &token, None).await;

    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["date"], "2025-06-03");
}
