//! Tracker error types with HTTP status code mapping.
//!
//! [`TrackerError`] is the central error type for the tracker. Each variant
//! maps to a specific HTTP status code and structured JSON error response,
//! so the read API can return storage and lookup failures directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "player not found: bob",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`TrackerError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Tracker error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status               |
/// |-----------|---------------------|---------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request           |
/// | 2000–2099 | Not Found           | 404 Not Found             |
/// | 2100–2199 | Ledger consistency  | 409 Conflict              |
/// | 3000–3999 | Server / upstream   | 500 / 502                 |
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// No player row matches the requested name.
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    /// No server row exists for the requested address and port.
    #[error("server not found: {address}:{port}")]
    ServerNotFound {
        /// Server address.
        address: String,
        /// Server port.
        port: u16,
    },

    /// No snapshot has been archived yet.
    #[error("no snapshot recorded")]
    SnapshotNotFound,

    /// The subscriber has no such alert.
    #[error("alert not found: {0}")]
    AlertNotFound(String),

    /// A player event arrived for a server without an open sighting.
    #[error("no open server sighting for {address}:{port}")]
    NoOpenServerSighting {
        /// Server address.
        address: String,
        /// Server port.
        port: u16,
    },

    /// A leave event named a player that was never recorded.
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Storage layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// A stored or outgoing payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The server directory could not be fetched or parsed.
    #[error("fetch error: {0}")]
    FetchError(String),

    /// A notification could not be delivered.
    #[error("notify error: {0}")]
    NotifyError(String),
}

impl TrackerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::PlayerNotFound(_) => 2001,
            Self::ServerNotFound { .. } => 2002,
            Self::SnapshotNotFound => 2003,
            Self::AlertNotFound(_) => 2004,
            Self::NoOpenServerSighting { .. } => 2101,
            Self::UnknownPlayer(_) => 2102,
            Self::PersistenceError(_) => 3001,
            Self::SerializationError(_) => 3002,
            Self::FetchError(_) => 3003,
            Self::NotifyError(_) => 3004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PlayerNotFound(_)
            | Self::ServerNotFound { .. }
            | Self::SnapshotNotFound
            | Self::AlertNotFound(_) => StatusCode::NOT_FOUND,
            Self::NoOpenServerSighting { .. } | Self::UnknownPlayer(_) => StatusCode::CONFLICT,
            Self::FetchError(_) | Self::NotifyError(_) => StatusCode::BAD_GATEWAY,
            Self::PersistenceError(_) | Self::SerializationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns `true` for ledger contract violations: an event that refers
    /// to a sighting or player the ledger has no record of.
    #[must_use]
    pub const fn is_consistency_violation(&self) -> bool {
        matches!(
            self,
            Self::NoOpenServerSighting { .. } | Self::UnknownPlayer(_)
        )
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
