//! HTTP-facing error taxonomy.
//!
//! Clients only ever see `{"message": "..."}`. Store failures are logged with
//! their cause and surfaced as a generic per-route message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::ConfigError;
use crate::db::{InvalidDocumentId, StoreError};
use crate::services::identity::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid identifier")]
    InvalidId,
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("{message}")]
    Clock {
        message: &'static str,
        #[source]
        source: time::error::Format,
    },
}

impl ApiError {
    /// Adapter for `map_err` that tags a store failure with the message the
    /// client will see.
    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { message, source }
    }

    /// Same as [`ApiError::store`] for a failure to stamp `createdAt`.
    pub fn clock(message: &'static str) -> impl FnOnce(time::error::Format) -> Self {
        move |source| Self::Clock { message, source }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidId | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Store { .. } | Self::Clock { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvalidDocumentId> for ApiError {
    fn from(_: InvalidDocumentId) -> Self {
        Self::InvalidId
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Store { message, source } => tracing::error!(error = %source, "{message}"),
            Self::Clock { message, source } => tracing::error!(error = %source, "{message}"),
            Self::Unauthorized | Self::InvalidId | Self::InvalidBody(_) => {}
        }
        let status = self.status();
        (status, Json(serde_json::json!({ "message": self.to_string() }))).into_response()
    }
}

/// Fatal errors raised while bringing the server up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("identity provider: {0}")]
    Identity(#[from] AuthError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
