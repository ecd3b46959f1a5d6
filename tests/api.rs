use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use event_booking::config::Config;
use event_booking::controllers;
use event_booking::database::DatabaseInfo;
use event_booking::AppState;

fn app() -> Router {
    let config = Config::from_lookup(|key| match key {
        "MONGODB_URI" => Some("mongodb://localhost:27017".to_string()),
        _ => None,
    })
    .unwrap();

    let state = AppState::with_database(config, DatabaseInfo::Reference);
    Router::new()
        .nest("/api", controllers::routes())
        .with_state(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn event_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "A full day of talks about systems programming.",
        "overview": "Talks, workshops and networking",
        "image": "/images/event1.png",
        "venue": "Moscone Center",
        "location": "San Francisco, CA",
        "date": "2025-03-05",
        "time": "6:00 PM",
        "mode": "offline",
        "audience": "Developers",
        "agenda": ["Keynote"],
        "organizer": "Rust Foundation",
        "tags": ["rust"]
    })
}

#[tokio::test]
async fn event_and_booking_flow() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/api/events", Some(event_body("Rust Night"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["event"]["slug"], "rust-night");
    assert_eq!(body["event"]["time"], "18:00");
    let event_id = body["event"]["_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/events/rust-night", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["_id"], event_id.as_str());

    let booking = json!({ "eventId": event_id, "email": "Ada@Example.com" });
    let (status, body) = send(&app, Method::POST, "/api/bookings", Some(booking.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["email"], "ada@example.com");

    let (status, body) = send(&app, Method::POST, "/api/bookings", Some(booking)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "UniquenessError");

    let (status, body) = send(&app, Method::GET, "/api/events/rust-night/bookings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn error_kinds_map_to_statuses() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/events/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let mut invalid = event_body("Rust Night");
    invalid["time"] = json!("25:00");
    let (status, body) = send(&app, Method::POST, "/api/events", Some(invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["time"].is_array());

    let booking = json!({ "eventId": "missing", "email": "ada@example.com" });
    let (status, body) = send(&app, Method::POST, "/api/bookings", Some(booking)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ReferentialIntegrityError");
}

#[tokio::test]
async fn update_and_delete_event() {
    let app = app();
    send(&app, Method::POST, "/api/events", Some(event_body("Rust Night"))).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/events/rust-night",
        Some(json!({ "title": "Rust Night Live", "date": "April 1, 2025" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["slug"], "rust-night-live");
    assert_eq!(body["event"]["date"], "2025-04-01");

    let (status, _) = send(&app, Method::DELETE, "/api/events/rust-night-live", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, "/api/events", None).await;
    assert_eq!(body["events"].as_array().unwrap().len(), 0);
}
