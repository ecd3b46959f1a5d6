use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Booking, DataCreateBooking};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}", delete(delete_booking))
}

// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(data): Json<DataCreateBooking>,
) -> Result<impl IntoResponse> {
    let db = state.db().await?;
    let booking = Booking::create(&db, data).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking created successfully",
            "booking": booking,
        })),
    ))
}

// DELETE /api/bookings/{id}
async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let db = state.db().await?;
    Booking::fetch(&db, &id).await?.delete(&db).await?;

    Ok(StatusCode::NO_CONTENT)
}
