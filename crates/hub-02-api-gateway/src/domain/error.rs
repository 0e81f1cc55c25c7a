//! API Gateway error types with HTTP status mapping.
//!
//! | Source | Status |
//! |--------|--------|
//! | malformed id, address, body or message field | 400 |
//! | entity not found | 404 |
//! | keeper rule violation | 409 |
//! | store failure | 500 |
//!
//! Error bodies are plain text carrying the error message.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use hub_01_vpn::{KeeperError, QueryError, ValidationError};
use shared_types::{AddressError, IdError};
use thiserror::Error;

/// Request-level error rendered as a plain-text HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error message
    pub message: String,
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Malformed request
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, details)
    }

    /// Resource not found
    pub fn not_found(details: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, details)
    }

    /// Rejected by a state rule
    pub fn conflict(details: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, details)
    }

    /// Internal error
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, details)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(
                status = self.status.as_u16(),
                error = %self.message,
                "[hub-02] request failed"
            );
        }
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message,
        )
            .into_response()
    }
}

// Conversions from domain error types

impl From<IdError> for ApiError {
    fn from(e: IdError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<AddressError> for ApiError {
    fn from(e: AddressError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::NotFound { .. } => ApiError::not_found(e.to_string()),
            QueryError::Internal(_) => ApiError::internal(e.to_string()),
        }
    }
}

impl From<KeeperError> for ApiError {
    fn from(e: KeeperError) -> Self {
        match e {
            KeeperError::Validation(_) => ApiError::bad_request(e.to_string()),
            KeeperError::NotFound { .. } => ApiError::not_found(e.to_string()),
            KeeperError::Store(_) => ApiError::internal(e.to_string()),
            _ => ApiError::conflict(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::bad_request(format!("invalid message: {e}"))
    }
}

/// Gateway startup and server errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server stopped with an error
    #[error("server error: {0}")]
    Server(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_01_vpn::StoreError;
    use shared_types::{EntityKind, Id};

    #[test]
    fn test_query_error_status() {
        let not_found = QueryError::NotFound {
            kind: EntityKind::Session,
            id: Id::new(4),
        };
        assert_eq!(ApiError::from(not_found).status, StatusCode::NOT_FOUND);

        let internal = ApiError::from(QueryError::Internal("disk".into()));
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(internal.message.contains("disk"));
    }

    #[test]
    fn test_keeper_error_status() {
        let validation = KeeperError::Validation(ValidationError::InvalidField("from"));
        assert_eq!(ApiError::from(validation).status, StatusCode::BAD_REQUEST);

        let missing = KeeperError::NotFound {
            kind: EntityKind::Node,
            id: Id::new(1),
        };
        assert_eq!(ApiError::from(missing).status, StatusCode::NOT_FOUND);

        let rule = KeeperError::NodeNotActive(Id::new(1));
        assert_eq!(ApiError::from(rule).status, StatusCode::CONFLICT);

        let store = KeeperError::Store(StoreError::Io("gone".into()));
        assert_eq!(ApiError::from(store).status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_malformed_input_is_bad_request() {
        let id = "abc".parse::<Id>().unwrap_err();
        assert_eq!(ApiError::from(id).status, StatusCode::BAD_REQUEST);

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::from(json);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.starts_with("invalid message"));
    }
}
