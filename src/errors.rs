//! Error types for the portal service
//!
//! A single structured error type covers every fallible path: request
//! validation, authorization, storage, and calls to the remote config
//! service. Handlers return `PortalError` and the `IntoResponse`
//! implementation maps each variant to an HTTP status and a JSON body
//! with a stable error code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Portal-wide error type
#[derive(Error, Debug)]
pub enum PortalError {
    /// Request payload or parameters failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No authenticated user on the request
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated user lacks the required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity not found by its identifier
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity kind, e.g. "ServerConfig"
        entity: &'static str,
        /// Identifier that missed
        id: String,
    },

    /// Portal has no active environments configured
    #[error("No active environment is configured")]
    NoActiveEnvironment,

    /// Remote config service call failed
    #[error("Config service call failed for environment '{env}': {reason}")]
    Remote {
        /// Environment the call targeted
        env: String,
        /// Upstream failure description
        reason: String,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Portal settings file could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    /// Stable machine-readable code rendered in error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::NoActiveEnvironment => "NO_ACTIVE_ENVIRONMENT",
            Self::Remote { .. } => "REMOTE_SERVICE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status the variant maps to
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::NoActiveEnvironment => StatusCode::SERVICE_UNAVAILABLE,
            Self::Remote { .. } => StatusCode::BAD_GATEWAY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side faults keep their detail in the logs, not the body.
        let message = if status.is_server_error() {
            error!("{}", self);
            match &self {
                Self::Remote { env, .. } => {
                    format!("Config service call failed for environment '{}'", env)
                }
                Self::NoActiveEnvironment => self.to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
