use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::lock::Mutex;

use crate::error::{Error, Result};
use crate::models::{Booking, Event};

use super::{AbstractBookings, AbstractEvents};

/// In-memory implementation holding the same unique constraints as the
/// MongoDB indexes
#[derive(Clone, Default)]
pub struct ReferenceDb {
    pub events: Arc<Mutex<HashMap<String, Event>>>,
    pub bookings: Arc<Mutex<HashMap<String, Booking>>>,
}

fn newest_first(mut events: Vec<Event>) -> Vec<Event> {
    // v7 ids sort by creation time
    events.sort_by(|a, b| b.id.cmp(&a.id));
    events
}

#[async_trait]
impl AbstractEvents for ReferenceDb {
    async fn insert_event(&self, event: &Event) -> Result<()> {
        let mut events = self.events.lock().await;
        if events.contains_key(&event.id) {
            return Err(Error::Uniqueness {
                collection: "events",
                index: "_id",
            });
        }
        if events.values().any(|other| other.slug == event.slug) {
            return Err(Error::Uniqueness {
                collection: "events",
                index: "slug_1",
            });
        }

        events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn fetch_event(&self, id: &str) -> Result<Event> {
        let events = self.events.lock().await;
        events.get(id).cloned().ok_or(Error::NotFound)
    }

    async fn fetch_event_by_slug(&self, slug: &str) -> Result<Event> {
        let events = self.events.lock().await;
        events
            .values()
            .find(|event| event.slug == slug)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn fetch_events(&self) -> Result<Vec<Event>> {
        let events = self.events.lock().await;
        Ok(newest_first(events.values().cloned().collect()))
    }

    async fn fetch_events_with_tags(
        &self,
        tags: &[String],
        exclude_id: &str,
    ) -> Result<Vec<Event>> {
        let events = self.events.lock().await;
        Ok(newest_first(
            events
                .values()
                .filter(|event| event.id != exclude_id)
                .filter(|event| event.tags.iter().any(|tag| tags.contains(tag)))
                .cloned()
                .collect(),
        ))
    }

    async fn event_exists(&self, id: &str) -> Result<bool> {
        let events = self.events.lock().await;
        Ok(events.contains_key(id))
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let mut events = self.events.lock().await;
        if !events.contains_key(&event.id) {
            return Err(Error::NotFound);
        }
        if events
            .values()
            .any(|other| other.id != event.id && other.slug == event.slug)
        {
            return Err(Error::Uniqueness {
                collection: "events",
                index: "slug_1",
            });
        }

        events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        let mut events = self.events.lock().await;
        if events.remove(id).is_some() {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }
}

fn pair_taken(bookings: &HashMap<String, Booking>, booking: &Booking) -> bool {
    bookings.values().any(|other| {
        other.id != booking.id
            && other.event_id == booking.event_id
            && other.email == booking.email
    })
}

#[async_trait]
impl AbstractBookings for ReferenceDb {
    async fn insert_booking(&self, booking: &Booking) -> Result<()> {
        let mut bookings = self.bookings.lock().await;
        if bookings.contains_key(&booking.id) {
            return Err(Error::Uniqueness {
                collection: "bookings",
                index: "_id",
            });
        }
        if pair_taken(&bookings, booking) {
            return Err(Error::Uniqueness {
                collection: "bookings",
                index: "eventId_1_email_1",
            });
        }

        bookings.insert(booking.id.clone(), booking.clone());
        Ok(())
    }

    async fn fetch_booking(&self, id: &str) -> Result<Booking> {
        let bookings = self.bookings.lock().await;
        bookings.get(id).cloned().ok_or(Error::NotFound)
    }

    async fn fetch_bookings_for_event(&self, event_id: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.lock().await;
        let mut found: Vec<Booking> = bookings
            .values()
            .filter(|booking| booking.event_id == event_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn count_bookings_for_event(&self, event_id: &str) -> Result<u64> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.event_id == event_id)
            .count() as u64)
    }

    async fn update_booking(&self, booking: &Booking) -> Result<()> {
        let mut bookings = self.bookings.lock().await;
        if !bookings.contains_key(&booking.id) {
            return Err(Error::NotFound);
        }
        if pair_taken(&bookings, booking) {
            return Err(Error::Uniqueness {
                collection: "bookings",
                index: "eventId_1_email_1",
            });
        }

        bookings.insert(booking.id.clone(), booking.clone());
        Ok(())
    }

    async fn delete_booking(&self, id: &str) -> Result<()> {
        let mut bookings = self.bookings.lock().await;
        if bookings.remove(id).is_some() {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }
}
