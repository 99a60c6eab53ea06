//! Host error types with HTTP status code mapping.
//!
//! [`HostError`] is the central error type of the crate. Authority denials
//! from the chat service never reach it: the moderation facade turns them
//! into a `false` result. Every other remote failure is carried as
//! [`HostError::Transport`].

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::TenantId;
use crate::transport::TransportError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "host not found: 42"
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Host error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                 |
/// |-----------|-----------------|-----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request             |
/// | 2000–2999 | Not Found       | 404 Not Found               |
/// | 3000–3999 | Storage/Server  | 500 Internal Server Error / 503 |
/// | 5000–5999 | Remote service  | 502 Bad Gateway / 429       |
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The tenant's durable record could not be created, read or written.
    #[error("persistence failure at {}: {source}", path.display())]
    Persistence {
        /// Path of the record involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The durable record exists but is not a JSON object.
    #[error("malformed document at {}: {reason}", path.display())]
    MalformedDocument {
        /// Path of the offending record.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// A remote call failed for a reason other than missing authority.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// No host is active for the given tenant.
    #[error("host not found: {0}")]
    HostNotFound(TenantId),

    /// The tenant's event queue is full; the event was not accepted.
    #[error("host busy: {0}")]
    HostBusy(TenantId),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HostError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::HostNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::Persistence { .. } => 3001,
            Self::MalformedDocument { .. } => 3002,
            Self::HostBusy(_) => 3003,
            Self::Transport(TransportError::RateLimited { .. }) => 5002,
            Self::Transport(_) => 5001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::HostNotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence { .. } | Self::MalformedDocument { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::HostBusy(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Transport(TransportError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}

impl IntoResponse for HostError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
