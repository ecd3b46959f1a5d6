use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::database::Database;
use crate::error::Result;
use crate::services::integrity::ensure_event_exists;

/// Stored booking document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    #[validate(length(min = 1))]
    pub event_id: String,
    #[validate(email)]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a booking
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataCreateBooking {
    pub event_id: String,
    pub email: String,
}

/// Fields to change on an existing booking
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBooking {
    pub event_id: Option<String>,
    pub email: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Booking {
    /// Validate and insert a new booking.
    ///
    /// Fails with a referential integrity error when the event is missing and
    /// with a uniqueness error when the email already booked this event.
    pub async fn create(db: &Database, data: DataCreateBooking) -> Result<Booking> {
        let now = Utc::now();
        let booking = Booking {
            id: uuid::Uuid::now_v7().to_string(),
            event_id: data.event_id.trim().to_string(),
            email: normalize_email(&data.email),
            created_at: now,
            updated_at: now,
        };

        booking.validate()?;
        ensure_event_exists(&**db, &booking.event_id, true).await?;

        db.insert_booking(&booking).await?;
        info!("Booked event {} ({})", booking.event_id, booking.id);
        Ok(booking)
    }

    pub async fn fetch(db: &Database, id: &str) -> Result<Booking> {
        db.fetch_booking(id).await
    }

    pub async fn for_event(db: &Database, event_id: &str) -> Result<Vec<Booking>> {
        db.fetch_bookings_for_event(event_id).await
    }

    pub async fn count_for_event(db: &Database, event_id: &str) -> Result<u64> {
        db.count_bookings_for_event(event_id).await
    }

    /// Apply a partial update; the event reference is re-checked only when it
    /// changes.
    pub async fn update(&mut self, db: &Database, partial: PartialBooking) -> Result<()> {
        let mut next = self.clone();
        if let Some(event_id) = &partial.event_id {
            next.event_id = event_id.trim().to_string();
        }
        if let Some(email) = &partial.email {
            next.email = normalize_email(email);
        }

        next.validate()?;
        ensure_event_exists(&**db, &next.event_id, next.event_id != self.event_id).await?;

        next.updated_at = Utc::now();
        db.update_booking(&next).await?;
        *self = next;
        Ok(())
    }

    pub async fn delete(self, db: &Database) -> Result<()> {
        db.delete_booking(&self.id).await
    }
}
