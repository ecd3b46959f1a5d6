use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::database::Database;
use crate::error::{Error, Result};
use crate::services::normalize::{normalize_event, EventChanges};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    Online,
    Offline,
    Hybrid,
}

impl FromStr for EventMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "online" => Ok(EventMode::Online),
            "offline" => Ok(EventMode::Offline),
            "hybrid" => Ok(EventMode::Hybrid),
            _ => Err(ValidationError::new("enum")
                .with_message(Cow::from("mode must be one of online, offline, hybrid"))),
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventMode::Online => "online",
            EventMode::Offline => "offline",
            EventMode::Hybrid => "hybrid",
        })
    }
}

/// Stored event document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    pub slug: String,
    #[validate(length(min = 10))]
    pub description: String,
    #[validate(length(min = 1))]
    pub overview: String,
    #[validate(length(min = 1))]
    pub image: String,
    #[validate(length(min = 1))]
    pub venue: String,
    #[validate(length(min = 1))]
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: EventMode,
    #[validate(length(min = 1))]
    pub audience: String,
    #[validate(length(min = 1))]
    pub agenda: Vec<String>,
    #[validate(length(min = 1))]
    pub organizer: String,
    #[validate(length(min = 1))]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating an event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataCreateEvent {
    pub title: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

/// Fields to change on an existing event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub image: Option<String>,
    pub venue: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub mode: Option<String>,
    pub audience: Option<String>,
    pub agenda: Option<Vec<String>>,
    pub organizer: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn clean(value: &str) -> String {
    value.trim().to_string()
}

fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_mode(value: &str) -> (Option<EventMode>, Option<ValidationError>) {
    match value.parse() {
        Ok(mode) => (Some(mode), None),
        Err(error) => (None, Some(error)),
    }
}

/// Run field constraints, folding in a rejected mode
fn check(event: &Event, mode_error: Option<ValidationError>) -> Result<()> {
    let mut errors = match event.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    if let Some(error) = mode_error {
        errors.add("mode", error);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

impl Event {
    /// Validate, normalize and insert a new event
    pub async fn create(db: &Database, data: DataCreateEvent) -> Result<Event> {
        let (mode, mode_error) = parse_mode(&data.mode);

        let now = Utc::now();
        let event = Event {
            id: uuid::Uuid::now_v7().to_string(),
            title: clean(&data.title),
            slug: String::new(),
            description: clean(&data.description),
            overview: clean(&data.overview),
            image: clean(&data.image),
            venue: clean(&data.venue),
            location: clean(&data.location),
            date: clean(&data.date),
            time: clean(&data.time),
            mode: mode.unwrap_or(EventMode::Offline),
            audience: clean(&data.audience),
            agenda: clean_list(&data.agenda),
            organizer: clean(&data.organizer),
            tags: clean_list(&data.tags),
            created_at: now,
            updated_at: now,
        };

        check(&event, mode_error)?;
        let event = normalize_event(event, EventChanges::all())?;

        db.insert_event(&event).await?;
        info!("Created event {} ({})", event.slug, event.id);
        Ok(event)
    }

    pub async fn fetch(db: &Database, id: &str) -> Result<Event> {
        db.fetch_event(id).await
    }

    /// Fetch by slug; the lookup key is trimmed and lowercased first
    pub async fn fetch_by_slug(db: &Database, slug: &str) -> Result<Event> {
        let slug = slug.trim().to_lowercase();
        if slug.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add(
                "slug",
                ValidationError::new("required").with_message(Cow::from("slug is required")),
            );
            return Err(Error::Validation(errors));
        }

        db.fetch_event_by_slug(&slug).await
    }

    /// All events, newest first
    pub async fn list(db: &Database) -> Result<Vec<Event>> {
        db.fetch_events().await
    }

    pub async fn exists(db: &Database, id: &str) -> Result<bool> {
        db.event_exists(id).await
    }

    /// Other events sharing at least one tag with this one
    pub async fn similar(&self, db: &Database) -> Result<Vec<Event>> {
        db.fetch_events_with_tags(&self.tags, &self.id).await
    }

    /// Apply a partial update and persist it.
    ///
    /// Only title, date and time changes trigger their derived or canonical
    /// forms to be recomputed; untouched fields stay exactly as stored.
    pub async fn update(&mut self, db: &Database, partial: PartialEvent) -> Result<()> {
        let mut mode_error = None;
        let mut next = self.clone();

        if let Some(title) = &partial.title {
            next.title = clean(title);
        }
        if let Some(description) = &partial.description {
            next.description = clean(description);
        }
        if let Some(overview) = &partial.overview {
            next.overview = clean(overview);
        }
        if let Some(image) = &partial.image {
            next.image = clean(image);
        }
        if let Some(venue) = &partial.venue {
            next.venue = clean(venue);
        }
        if let Some(location) = &partial.location {
            next.location = clean(location);
        }
        if let Some(date) = &partial.date {
            next.date = clean(date);
        }
        if let Some(time) = &partial.time {
            next.time = clean(time);
        }
        if let Some(mode) = &partial.mode {
            match parse_mode(mode) {
                (Some(mode), _) => next.mode = mode,
                (None, error) => mode_error = error,
            }
        }
        if let Some(audience) = &partial.audience {
            next.audience = clean(audience);
        }
        if let Some(agenda) = &partial.agenda {
            next.agenda = clean_list(agenda);
        }
        if let Some(organizer) = &partial.organizer {
            next.organizer = clean(organizer);
        }
        if let Some(tags) = &partial.tags {
            next.tags = clean_list(tags);
        }

        let changes = EventChanges::between(self, &next);
        debug!("Updating event {} with changes {:?}", self.id, changes);

        check(&next, mode_error)?;
        let mut next = normalize_event(next, changes)?;
        next.updated_at = Utc::now();

        db.update_event(&next).await?;
        *self = next;
        Ok(())
    }

    /// Delete this event. Bookings referencing it are left in place.
    pub async fn delete(self, db: &Database) -> Result<()> {
        db.delete_event(&self.id).await
    }
}
