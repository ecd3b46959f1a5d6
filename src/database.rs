use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Booking, Event};

mod mongodb;
mod reference;

pub use self::mongodb::MongoDb;
pub use self::reference::ReferenceDb;

/// Where to find the database
#[derive(Clone, Debug)]
pub enum DatabaseInfo {
    /// In-memory reference implementation
    Reference,
    /// Connect to MongoDB
    MongoDb { uri: String, database_name: String },
}

/// Connected database handle
#[derive(Clone)]
pub enum Database {
    Reference(ReferenceDb),
    MongoDb(MongoDb),
}

impl DatabaseInfo {
    pub fn from_config(config: &crate::config::DatabaseConfig) -> Self {
        DatabaseInfo::MongoDb {
            uri: config.uri.clone(),
            database_name: config.name.clone(),
        }
    }

    /// Establish a connection. Nothing is cached here, see
    /// [`crate::connection::ConnectionCache`].
    pub async fn connect(self) -> Result<Database> {
        match self {
            DatabaseInfo::Reference => Ok(Database::Reference(ReferenceDb::default())),
            DatabaseInfo::MongoDb { uri, database_name } => {
                Ok(Database::MongoDb(MongoDb::connect(&uri, database_name).await?))
            }
        }
    }
}

#[async_trait]
pub trait AbstractEvents: Sync + Send {
    /// Insert a new event; the slug must not be taken
    async fn insert_event(&self, event: &Event) -> Result<()>;

    /// Fetch an event by its id
    async fn fetch_event(&self, id: &str) -> Result<Event>;

    /// Fetch an event by its slug
    async fn fetch_event_by_slug(&self, slug: &str) -> Result<Event>;

    /// Fetch all events, newest first
    async fn fetch_events(&self) -> Result<Vec<Event>>;

    /// Fetch events sharing any of the given tags, newest first
    async fn fetch_events_with_tags(&self, tags: &[String], exclude_id: &str)
        -> Result<Vec<Event>>;

    /// Check whether an event with the given id exists
    async fn event_exists(&self, id: &str) -> Result<bool>;

    /// Replace a stored event
    async fn update_event(&self, event: &Event) -> Result<()>;

    /// Delete an event by its id
    async fn delete_event(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait AbstractBookings: Sync + Send {
    /// Insert a new booking; the (event, email) pair must not be taken
    async fn insert_booking(&self, booking: &Booking) -> Result<()>;

    /// Fetch a booking by its id
    async fn fetch_booking(&self, id: &str) -> Result<Booking>;

    /// Fetch all bookings for an event
    async fn fetch_bookings_for_event(&self, event_id: &str) -> Result<Vec<Booking>>;

    /// Count bookings for an event
    async fn count_bookings_for_event(&self, event_id: &str) -> Result<u64>;

    /// Replace a stored booking
    async fn update_booking(&self, booking: &Booking) -> Result<()>;

    /// Delete a booking by its id
    async fn delete_booking(&self, id: &str) -> Result<()>;
}

pub trait AbstractDatabase: Sync + Send + AbstractEvents + AbstractBookings {}

impl AbstractDatabase for ReferenceDb {}
impl AbstractDatabase for MongoDb {}

impl std::ops::Deref for Database {
    type Target = dyn AbstractDatabase;

    fn deref(&self) -> &Self::Target {
        match self {
            Database::Reference(dummy) => dummy,
            Database::MongoDb(mongo) => mongo,
        }
    }
}
