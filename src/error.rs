use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::ValidationErrors;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the data layer can report.
///
/// `Clone` so one failed connection attempt can be handed to every task
/// waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to connect to database: {0}")]
    Connection(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("event {event_id} does not exist")]
    ReferentialIntegrity { event_id: String },

    #[error("duplicate record in {collection} violates unique index {index}")]
    Uniqueness {
        collection: &'static str,
        index: &'static str,
    },

    #[error("record not found")]
    NotFound,

    #[error("{operation} on {collection} failed: {message}")]
    Database {
        operation: &'static str,
        collection: &'static str,
        message: String,
    },
}

impl Error {
    pub fn database(
        operation: &'static str,
        collection: &'static str,
        error: impl std::fmt::Display,
    ) -> Self {
        Error::Database {
            operation,
            collection,
            message: error.to_string(),
        }
    }

    /// Short machine readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "ConfigurationError",
            Error::Connection(_) => "ConnectionError",
            Error::Validation(_) => "ValidationError",
            Error::ReferentialIntegrity { .. } => "ReferentialIntegrityError",
            Error::Uniqueness { .. } => "UniquenessError",
            Error::NotFound => "NotFound",
            Error::Database { .. } => "DatabaseError",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::ReferentialIntegrity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Uniqueness { .. } => StatusCode::CONFLICT,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Configuration(_) | Error::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        let body = match &self {
            Error::Validation(errors) => json!({
                "message": "Validation failed",
                "error": self.kind(),
                "fields": errors,
            }),
            // Driver details stay in the logs
            Error::Database { .. } => json!({
                "message": "Internal server error",
                "error": self.kind(),
            }),
            _ => json!({
                "message": self.to_string(),
                "error": self.kind(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
