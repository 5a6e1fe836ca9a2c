use axum::http::StatusCode;
use http_body_util::BodyExt;
use std::time::Duration;
use teamgrid_core::event::{parse_frames, BroadcastEvent};
use teamgrid_server::{build_router, AppState};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut req = axum::http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            req = req.header("content-type", "application/json");
            axum::body::Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => axum::body::Body::empty(),
    };
    let response = app.oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

/// A server with users alice and bob and project apollo (alice is a member).
async fn seeded() -> (AppState, axum::Router) {
    let state = AppState::in_memory();
    let app = build_router(state.clone());
    for (id, name) in [("alice", "Alice"), ("bob", "Bob")] {
        let (status, _) = post_json(
            app.clone(),
            "/api/users",
            serde_json::json!({ "id": id, "name": name, "email": format!("{id}@example.com") }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = post_json(
        app.clone(),
        "/api/projects",
        serde_json::json!({ "id": "apollo", "name": "Apollo", "startDate": "2024-01-10" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post_json(
        app.clone(),
        "/api/projects/apollo/members",
        serde_json::json!({ "userId": "alice" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (state, app)
}

fn upsert_body(user: &str, date: &str, part: &str, status: &str) -> serde_json::Value {
    serde_json::json!({ "userId": user, "date": date, "dayPart": part, "status": status })
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn availability_requires_project_id() {
    let (_state, app) = seeded().await;
    let (status, body) = get(app, "/api/availability").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "projectId is required");
}

#[tokio::test]
async fn availability_for_unknown_project_is_404() {
    let (_state, app) = seeded().await;
    let (status, body) = get(app, "/api/availability?projectId=zeus").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("zeus"));
}

#[tokio::test]
async fn upsert_then_list_returns_member_records_only() {
    let (_state, app) = seeded().await;

    let (status, first) = post_json(
        app.clone(),
        "/api/availability",
        upsert_body("alice", "2024-01-08", "MORNING", "FREE"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(first["id"].is_string());

    let (_, second) = post_json(
        app.clone(),
        "/api/availability",
        upsert_body("alice", "2024-01-08", "MORNING", "NOT_WORKING"),
    )
    .await;
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["status"], "NOT_WORKING");

    // bob is not a member of apollo.
    post_json(
        app.clone(),
        "/api/availability",
        upsert_body("bob", "2024-01-08", "MORNING", "FREE"),
    )
    .await;

    let (status, records) = get(app, "/api/availability?projectId=apollo").await;
    assert_eq!(status, StatusCode::OK);
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["userId"], "alice");
    assert_eq!(records[0]["date"], "2024-01-08");
    assert_eq!(records[0]["status"], "NOT_WORKING");
}

#[tokio::test]
async fn upsert_rejects_bad_fields() {
    let (_state, app) = seeded().await;
    for body in [
        upsert_body("alice", "2024-01-08", "MORNING", "BUSY"),
        upsert_body("alice", "2024-01-08", "NIGHT", "FREE"),
        upsert_body("alice", "yesterday", "MORNING", "FREE"),
    ] {
        let (status, json) = post_json(app.clone(), "/api/availability", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn upsert_with_missing_fields_is_json_400() {
    let (_state, app) = seeded().await;
    let (status, json) = post_json(
        app.clone(),
        "/api/availability",
        serde_json::json!({ "userId": "alice", "date": "2024-01-08" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("invalid request body"));

    // Not JSON at all.
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/availability")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn upsert_for_unknown_user_is_404_and_stores_nothing() {
    let (state, app) = seeded().await;
    let (status, json) = post_json(
        app.clone(),
        "/api/availability",
        upsert_body("ghost", "2024-01-08", "MORNING", "FREE"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("ghost"));
    assert!(state.store.user_availability("ghost").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Live updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_with_bad_status_is_json_400() {
    let (_state, app) = seeded().await;
    let (status, json) = post_json(
        app,
        "/api/availability-updates",
        serde_json::json!({
            "projectId": "apollo",
            "userId": "alice",
            "date": "2024-01-08",
            "dayPart": "AFTERNOON",
            "status": "ON_HOLIDAY",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("invalid request body"));
}

#[tokio::test]
async fn publish_returns_success_with_no_viewers() {
    let (_state, app) = seeded().await;
    let (status, body) = post_json(
        app,
        "/api/availability-updates",
        serde_json::json!({
            "projectId": "apollo",
            "userId": "alice",
            "date": "2024-01-08",
            "dayPart": "AFTERNOON",
            "status": "WORKING",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn stream_delivers_published_frame() {
    let (state, app) = seeded().await;
    let req = axum::http::Request::builder()
        .uri("/api/availability-updates")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(state.hub.sink_count(), 1);

    let (status, _) = post_json(
        app,
        "/api/availability-updates",
        serde_json::json!({
            "projectId": "apollo",
            "userId": "alice",
            "date": "2024-01-08",
            "dayPart": "MORNING",
            "status": "FREE",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut body = response.into_body();
    let mut buf = Vec::new();
    while !buf.windows(2).any(|w| w == b"\n\n") {
        let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await
            .expect("frame within timeout")
            .expect("stream still open")
            .unwrap();
        if let Ok(data) = frame.into_data() {
            buf.extend_from_slice(&data);
        }
    }

    let text = String::from_utf8(buf.clone()).unwrap();
    assert!(text.starts_with("data: {"), "unexpected frame: {text}");
    let events: Vec<BroadcastEvent> = parse_frames(&buf)
        .into_iter()
        .map(|e| e.unwrap())
        .collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].project_id, "apollo");
    assert_eq!(events[0].user_id, "alice");

    drop(body);
    assert_eq!(state.hub.sink_count(), 0);
}

// ---------------------------------------------------------------------------
// Projects and users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn project_detail_resolves_members() {
    let (_state, app) = seeded().await;
    let (status, body) = get(app, "/api/projects/apollo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "apollo");
    assert_eq!(body["startDate"], "2024-01-10");
    assert_eq!(body["members"][0]["displayName"], "Alice");
    assert_eq!(body["members"][0]["email"], "alice@example.com");
}

#[tokio::test]
async fn duplicate_project_is_409() {
    let (_state, app) = seeded().await;
    let (status, _) = post_json(
        app,
        "/api/projects",
        serde_json::json!({ "id": "apollo", "name": "Again", "startDate": "2024-01-10" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn patch_requires_name() {
    let (_state, app) = seeded().await;
    let (status, _) = send(
        app.clone(),
        "PATCH",
        "/api/projects/apollo",
        Some(serde_json::json!({ "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app,
        "PATCH",
        "/api/projects/apollo",
        Some(serde_json::json!({ "name": "Apollo II", "sprintStartDay": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Apollo II");
    assert_eq!(body["sprintStartDay"], 3);
    assert_eq!(body["startDate"], "2024-01-10");
}

#[tokio::test]
async fn patch_accepts_timestamp_start_date() {
    let (_state, app) = seeded().await;
    let (status, body) = send(
        app,
        "PATCH",
        "/api/projects/apollo",
        Some(serde_json::json!({ "name": "Apollo", "startDate": "2024-01-03T00:00:00.000Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["startDate"], "2024-01-03");
}

#[tokio::test]
async fn member_add_and_remove() {
    let (_state, app) = seeded().await;
    let (status, body) = post_json(
        app.clone(),
        "/api/projects/apollo/members",
        serde_json::json!({ "userId": "bob" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 2);

    let (status, _) = post_json(
        app.clone(),
        "/api/projects/apollo/members",
        serde_json::json!({ "userId": "nobody" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(app.clone(), "DELETE", "/api/projects/apollo/members/bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 1);

    let (status, _) = send(app, "DELETE", "/api/projects/apollo/members/bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sprints_add_list_remove() {
    let (_state, app) = seeded().await;
    post_json(
        app.clone(),
        "/api/projects/apollo/sprints",
        serde_json::json!({ "date": "2024-01-22" }),
    )
    .await;
    let (status, body) = post_json(
        app.clone(),
        "/api/projects/apollo/sprints",
        serde_json::json!({ "date": "2024-01-08" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["2024-01-08", "2024-01-22"]));

    let (status, body) = send(
        app.clone(),
        "DELETE",
        "/api/projects/apollo/sprints?date=2024-01-22",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["2024-01-08"]));

    let (_, body) = get(app.clone(), "/api/projects/apollo/sprints").await;
    assert_eq!(body, serde_json::json!(["2024-01-08"]));

    let (status, body) = send(app, "DELETE", "/api/projects/apollo/sprints", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid query string"));
}

#[tokio::test]
async fn users_list_and_validation() {
    let (_state, app) = seeded().await;
    let (status, body) = get(app.clone(), "/api/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = post_json(
        app,
        "/api/users",
        serde_json::json!({ "id": "Not Valid", "email": "x@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
