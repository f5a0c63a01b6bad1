//! HTTP error responses.
//!
//! Every error leaves the server as `{"error": <message>, "status": <code>}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{
    domain::RepositoryError,
    usecase::{ChannelError, ConnectError, UserError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// The cause is logged; the client only sees `message`.
    pub fn internal(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let message = message.into();
        tracing::error!("{}: {}", message, cause);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "status": self.status.as_u16(),
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::EmptyCredentials => Self::bad_request(e.to_string()),
            UserError::UsernameTaken => Self::new(StatusCode::CONFLICT, e.to_string()),
            UserError::NotFound => Self::not_found(e.to_string()),
            UserError::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, e.to_string()),
            UserError::Password(cause) => Self::internal("Failed to process password", cause),
            UserError::Repository(cause) => Self::internal("Failed to access users", cause),
        }
    }
}

impl From<ChannelError> for ApiError {
    fn from(e: ChannelError) -> Self {
        match e {
            ChannelError::MissingFields | ChannelError::CreatorNotFound => {
                Self::bad_request(e.to_string())
            }
            ChannelError::NameTaken => Self::new(StatusCode::CONFLICT, e.to_string()),
            ChannelError::NotFound => Self::not_found(e.to_string()),
            ChannelError::NotCreator => Self::new(StatusCode::FORBIDDEN, e.to_string()),
            ChannelError::Repository(cause) => Self::internal("Failed to access channels", cause),
        }
    }
}

impl From<ConnectError> for ApiError {
    fn from(e: ConnectError) -> Self {
        match e {
            ConnectError::UserNotFound | ConnectError::ChannelNotFound => {
                Self::not_found(e.to_string())
            }
            ConnectError::Repository(cause) => Self::internal("Failed to resolve connection", cause),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::not_found("Not found"),
            RepositoryError::Conflict(_) => Self::new(StatusCode::CONFLICT, "Conflict"),
            RepositoryError::Database(_) => Self::internal("Database error", e),
        }
    }
}
