use std::ops::Deref;

use ::mongodb::bson::{doc, Document};
use ::mongodb::error::{ErrorKind, WriteError, WriteFailure};
use ::mongodb::options::IndexOptions;
use ::mongodb::{Client, Collection, IndexModel};
use async_trait::async_trait;
use futures::TryStreamExt;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Booking, Event};

use super::{AbstractBookings, AbstractEvents};

static EVENTS: &str = "events";
static BOOKINGS: &str = "bookings";

/// MongoDB implementation
#[derive(Clone)]
pub struct MongoDb(pub Client, pub String);

impl Deref for MongoDb {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn is_duplicate_key(error: &::mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError { code: 11000, .. }))
    )
}

impl MongoDb {
    /// Create the client, wait for the server to answer and make sure the
    /// indexes exist. The handle is never returned before the server is
    /// reachable, so no command can be issued against a pending connection.
    pub async fn connect(uri: &str, database_name: String) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|error| Error::Connection(error.to_string()))?;

        let db = MongoDb(client, database_name);
        db.db()
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|error| Error::Connection(error.to_string()))?;

        db.create_indexes().await?;
        Ok(db)
    }

    /// Get the service database
    pub fn db(&self) -> ::mongodb::Database {
        self.database(&self.1)
    }

    /// Get a collection by its name
    pub fn col<T: Send + Sync>(&self, collection: &str) -> Collection<T> {
        self.db().collection(collection)
    }

    async fn create_indexes(&self) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.col::<Document>(EVENTS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "slug": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(|error| Error::database("createIndex", EVENTS, error))?;

        self.col::<Document>(BOOKINGS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "eventId": 1, "email": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(|error| Error::database("createIndex", BOOKINGS, error))?;

        self.col::<Document>(BOOKINGS)
            .create_index(IndexModel::builder().keys(doc! { "eventId": 1 }).build())
            .await
            .map_err(|error| Error::database("createIndex", BOOKINGS, error))?;

        info!("Indexes ready on {}", self.1);
        Ok(())
    }
}

#[async_trait]
impl AbstractEvents for MongoDb {
    async fn insert_event(&self, event: &Event) -> Result<()> {
        self.col::<Event>(EVENTS)
            .insert_one(event)
            .await
            .map(|_| ())
            .map_err(|error| {
                if is_duplicate_key(&error) {
                    Error::Uniqueness {
                        collection: EVENTS,
                        index: "slug_1",
                    }
                } else {
                    Error::database("insert_one", EVENTS, error)
                }
            })
    }

    async fn fetch_event(&self, id: &str) -> Result<Event> {
        self.col::<Event>(EVENTS)
            .find_one(doc! { "_id": id })
            .await
            .map_err(|error| Error::database("find_one", EVENTS, error))?
            .ok_or(Error::NotFound)
    }

    async fn fetch_event_by_slug(&self, slug: &str) -> Result<Event> {
        self.col::<Event>(EVENTS)
            .find_one(doc! { "slug": slug })
            .await
            .map_err(|error| Error::database("find_one", EVENTS, error))?
            .ok_or(Error::NotFound)
    }

    async fn fetch_events(&self) -> Result<Vec<Event>> {
        // v7 ids sort by creation time
        self.col::<Event>(EVENTS)
            .find(doc! {})
            .sort(doc! { "_id": -1 })
            .await
            .map_err(|error| Error::database("find", EVENTS, error))?
            .try_collect()
            .await
            .map_err(|error| Error::database("find", EVENTS, error))
    }

    async fn fetch_events_with_tags(
        &self,
        tags: &[String],
        exclude_id: &str,
    ) -> Result<Vec<Event>> {
        self.col::<Event>(EVENTS)
            .find(doc! {
                "_id": { "$ne": exclude_id },
                "tags": { "$in": tags.to_vec() },
            })
            .sort(doc! { "_id": -1 })
            .await
            .map_err(|error| Error::database("find", EVENTS, error))?
            .try_collect()
            .await
            .map_err(|error| Error::database("find", EVENTS, error))
    }

    async fn event_exists(&self, id: &str) -> Result<bool> {
        self.col::<Document>(EVENTS)
            .find_one(doc! { "_id": id })
            .projection(doc! { "_id": 1 })
            .await
            .map(|found| found.is_some())
            .map_err(|error| Error::database("find_one", EVENTS, error))
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let result = self
            .col::<Event>(EVENTS)
            .replace_one(doc! { "_id": event.id.as_str() }, event)
            .await
            .map_err(|error| {
                if is_duplicate_key(&error) {
                    Error::Uniqueness {
                        collection: EVENTS,
                        index: "slug_1",
                    }
                } else {
                    Error::database("replace_one", EVENTS, error)
                }
            })?;

        if result.matched_count == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        let result = self
            .col::<Event>(EVENTS)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|error| Error::database("delete_one", EVENTS, error))?;

        if result.deleted_count == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AbstractBookings for MongoDb {
    async fn insert_booking(&self, booking: &Booking) -> Result<()> {
        self.col::<Booking>(BOOKINGS)
            .insert_one(booking)
            .await
            .map(|_| ())
            .map_err(|error| {
                if is_duplicate_key(&error) {
                    Error::Uniqueness {
                        collection: BOOKINGS,
                        index: "eventId_1_email_1",
                    }
                } else {
                    Error::database("insert_one", BOOKINGS, error)
                }
            })
    }

    async fn fetch_booking(&self, id: &str) -> Result<Booking> {
        self.col::<Booking>(BOOKINGS)
            .find_one(doc! { "_id": id })
            .await
            .map_err(|error| Error::database("find_one", BOOKINGS, error))?
            .ok_or(Error::NotFound)
    }

    async fn fetch_bookings_for_event(&self, event_id: &str) -> Result<Vec<Booking>> {
        self.col::<Booking>(BOOKINGS)
            .find(doc! { "eventId": event_id })
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|error| Error::database("find", BOOKINGS, error))?
            .try_collect()
            .await
            .map_err(|error| Error::database("find", BOOKINGS, error))
    }

    async fn count_bookings_for_event(&self, event_id: &str) -> Result<u64> {
        self.col::<Booking>(BOOKINGS)
            .count_documents(doc! { "eventId": event_id })
            .await
            .map_err(|error| Error::database("count_documents", BOOKINGS, error))
    }

    async fn update_booking(&self, booking: &Booking) -> Result<()> {
        let result = self
            .col::<Booking>(BOOKINGS)
            .replace_one(doc! { "_id": booking.id.as_str() }, booking)
            .await
            .map_err(|error| {
                if is_duplicate_key(&error) {
                    Error::Uniqueness {
                        collection: BOOKINGS,
                        index: "eventId_1_email_1",
                    }
                } else {
                    Error::database("replace_one", BOOKINGS, error)
                }
            })?;

        if result.matched_count == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    async fn delete_booking(&self, id: &str) -> Result<()> {
        let result = self
            .col::<Booking>(BOOKINGS)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|error| Error::database("delete_one", BOOKINGS, error))?;

        if result.deleted_count == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}
