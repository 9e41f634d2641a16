//! # Error Handling for List APIs
//!
//! Every failure on a list endpoint ends up as an [`ApiError`], which:
//! - Returns the matching HTTP status code
//! - Sends the `{"success": false, "error": "..."}` envelope
//! - Logs internal details through `tracing` without sending them
//!
//! ## Usage
//!
//! ```rust,ignore
//! use querycrate::ApiError;
//!
//! async fn get_bootcamp(
//!     State(bootcamps): State<Arc<MemoryCollection>>,
//!     Path(id): Path<String>,
//! ) -> Result<Json<Value>, ApiError> {
//!     // NotFound becomes 404, storage failures 500
//!     let bootcamp = bootcamps.find_by_id(&id).await?;
//!     Ok(Json(bootcamp))
//! }
//! ```
//!
//! ## Status mapping
//!
//! | Source                                   | Status |
//! |------------------------------------------|--------|
//! | `FilterError`                            | 400    |
//! | `CollectionError::NotFound`              | 404    |
//! | `CollectionError::Cast`                  | 404    |
//! | `CollectionError::Duplicate`             | 400    |
//! | `CollectionError::Validation`            | 400    |
//! | `CollectionError::Unsupported`           | 400    |
//! | `CollectionError::InvalidField`          | 400    |
//! | `CollectionError::Database` / `Internal` | 500    |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

use crate::core::CollectionError;
use crate::filtering::FilterError;
use crate::operations::QueryError;

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - Resource doesn't exist
    NotFound {
        /// Resource type (e.g., "bootcamps")
        resource: String,
        /// Optional ID that wasn't found
        id: Option<String>,
    },

    /// 400 Bad Request - Invalid input from user
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - Document failed validation
    ValidationFailed {
        /// User-facing validation errors
        errors: Vec<String>,
    },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - Generic internal error
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },

    /// Custom error with specific status code
    Custom {
        status: StatusCode,
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    pub fn custom(status: StatusCode, message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Custom {
            status,
            message: message.into(),
            internal,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } | Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Custom { status, .. } => *status,
        }
    }

    /// The user-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id: Some(id) } => {
                format!("{resource} with ID '{id}' not found")
            }
            Self::NotFound { resource, id: None } => format!("{resource} not found"),
            Self::ValidationFailed { errors } => errors.join(", "),
            Self::BadRequest { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. }
            | Self::Custom { message, .. } => message.clone(),
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal { internal: Some(details), .. } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            Self::Custom { internal: Some(details), status, .. } => {
                tracing::error!(status = %status, details = %details, "Custom error occurred");
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

/// Error envelope sent to users
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let details = match &self {
            Self::ValidationFailed { errors } if errors.len() > 1 => Some(errors.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            success: false,
            error: self.user_message(),
            details,
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::not_found(resource, None)
            }
            _ => Self::database(err),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<CollectionError> for ApiError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::NotFound { collection, id } => Self::not_found(collection, id),
            CollectionError::Cast { value, .. } => Self::custom(
                StatusCode::NOT_FOUND,
                format!("Resource not found with id of {value}"),
                None,
            ),
            CollectionError::Duplicate { field } => {
                Self::bad_request(format!("Duplicate field value entered. Field: {field}"))
            }
            CollectionError::Validation { errors } => Self::validation_failed(errors),
            err @ (CollectionError::Unsupported { .. } | CollectionError::InvalidField { .. }) => {
                Self::bad_request(err.to_string())
            }
            CollectionError::Database(err) => Self::from(err),
            CollectionError::Internal(details) => Self::internal("Server Error", Some(details)),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Filter(err) => Self::from(err),
            QueryError::Collection(err) => Self::from(err),
        }
    }
}
