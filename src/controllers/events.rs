use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Booking, DataCreateEvent, Event, PartialEvent};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{slug}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/{slug}/similar", get(similar_events))
        .route("/events/{slug}/bookings", get(count_bookings))
}

// GET /api/events
async fn list_events(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let db = state.db().await?;
    let events = Event::list(&db).await?;

    Ok(Json(json!({
        "message": "Events fetched successfully",
        "events": events,
    })))
}

// POST /api/events
async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(data): Json<DataCreateEvent>,
) -> Result<impl IntoResponse> {
    let db = state.db().await?;
    let event = Event::create(&db, data).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Event created successfully",
            "event": event,
        })),
    ))
}

// GET /api/events/{slug}
async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let db = state.db().await?;
    let event = Event::fetch_by_slug(&db, &slug).await?;

    Ok(Json(json!({
        "message": "Event fetched successfully",
        "event": event,
    })))
}

// PATCH /api/events/{slug}
async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(partial): Json<PartialEvent>,
) -> Result<impl IntoResponse> {
    let db = state.db().await?;
    let mut event = Event::fetch_by_slug(&db, &slug).await?;
    event.update(&db, partial).await?;

    Ok(Json(json!({
        "message": "Event updated successfully",
        "event": event,
    })))
}

// DELETE /api/events/{slug}
async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let db = state.db().await?;
    Event::fetch_by_slug(&db, &slug).await?.delete(&db).await?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/events/{slug}/similar
async fn similar_events(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let db = state.db().await?;
    let events = Event::fetch_by_slug(&db, &slug).await?.similar(&db).await?;

    Ok(Json(json!({
        "message": "Similar events fetched successfully",
        "events": events,
    })))
}

// GET /api/events/{slug}/bookings
async fn count_bookings(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let db = state.db().await?;
    let event = Event::fetch_by_slug(&db, &slug).await?;
    let count = Booking::count_for_event(&db, &event.id).await?;

    Ok(Json(json!({ "count": count })))
}
