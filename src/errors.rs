//! Error handling for the generated endpoints.
//!
//! Every handler returns `Result<_, ApiError>`. The error carries enough to
//! pick the HTTP status and a sanitized body; internal database details are
//! logged through `tracing` and never sent to clients.
//!
//! Wire contract:
//! - validation failures answer 400 with the bare field-to-messages map
//! - everything else answers `{"detail": "<message>"}`
//!
//! # Usage
//!
//! ```rust,ignore
//! use scrud::ApiError;
//!
//! async fn my_handler() -> Result<Json<MyData>, ApiError> {
//!     let row = MyEntity::find_by_id(id)
//!         .one(db)
//!         .await
//!         .map_err(ApiError::database)?
//!         .ok_or_else(|| ApiError::not_found("member"))?;
//!
//!     Ok(Json(row))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;

use crate::validation::FieldErrors;

/// API error with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - no record matched within the requested scope
    NotFound {
        /// Resource name (e.g. "member")
        resource: String,
    },

    /// 404 Not Found - page number missing from the paginated scope
    InvalidPage,

    /// 400 Bad Request - payload failed schema validation
    Validation(FieldErrors),

    /// 401 Unauthorized - caller identity required but absent
    Unauthorized {
        /// User-facing error message
        message: String,
    },

    /// 403 Forbidden - caller lacks permission for the action
    Forbidden {
        /// User-facing error message
        message: String,
    },

    /// 409 Conflict - duplicate key or similar constraint violation
    Conflict {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - database failure (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },
}

impl ApiError {
    /// Create a 404 Not Found error for a resource
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a 404 for a page number outside the paginated scope
    #[must_use]
    pub fn invalid_page() -> Self {
        Self::InvalidPage
    }

    /// Create a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a 500 from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::InvalidPage => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource } => format!("{resource} not found"),
            Self::InvalidPage => "Invalid page.".to_string(),
            Self::Validation(errors) => errors.to_string(),
            Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Conflict { message }
            | Self::Database { message, .. } => message.clone(),
        }
    }

    /// Log internal error details (not sent to user)
    ///
    /// Uses the `tracing` crate; silent unless the host set up a subscriber.
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(
                    error = ?internal,
                    "Database error occurred"
                );
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Response body for non-validation errors
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    /// Human-readable failure description
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        match self {
            // Validation maps serialize as-is: {"field": ["message", ...]}
            Self::Validation(errors) => (status, Json(errors)).into_response(),
            _ => {
                let body = ErrorDetail {
                    detail: self.user_message(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// Convert Sea-ORM errors
///
/// Conversion rules:
/// - `DbErr::RecordNotFound` → 404 Not Found
/// - unique constraint violations → 409 Conflict
/// - all other variants → 500 (logged internally, sanitized for users)
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::Conflict {
                message: format!("Conflict: {detail}"),
            };
        }
        match &err {
            DbErr::RecordNotFound(msg) => {
                // RecordNotFound messages start with the resource name
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::NotFound {
                    resource: resource.to_string(),
                }
            }
            _ => Self::Database {
                message: "A database error occurred".to_string(),
                internal: err,
            },
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
