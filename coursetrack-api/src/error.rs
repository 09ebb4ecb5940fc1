/// Error handling for the API server
///
/// Every resolver failure is an [`ApiError`]. Its message is surfaced
/// verbatim as the GraphQL error message, and `extensions.code` carries a
/// stable machine-readable category:
///
/// | Variant      | `extensions.code`  |
/// |--------------|--------------------|
/// | `Validation` | `VALIDATION_ERROR` |
/// | `Conflict`   | `CONFLICT`         |
/// | `Auth`       | `AUTH_ERROR`       |
/// | `NotFound`   | `NOT_FOUND`        |
/// | `Session`    | `SESSION_ERROR`    |
/// | `Internal`   | `INTERNAL_ERROR`   |
///
/// Validation errors also carry `extensions.fields`, one `{ field, message }`
/// entry per violation. Internal errors are logged with their cause and
/// reported to clients with a generic message.
///
/// # Example
///
/// ```
/// use async_graphql::ErrorExtensions;
/// use coursetrack_api::error::ApiError;
///
/// let err = ApiError::NotFound("Course not found".to_string()).extend();
/// assert_eq!(err.message, "Course not found");
/// ```

use async_graphql::ErrorExtensions;
use coursetrack_shared::auth::authorization::AuthzError;
use coursetrack_shared::auth::credentials::{FieldViolation, InvalidInput};
use coursetrack_shared::auth::password::PasswordError;
use coursetrack_shared::auth::session::SessionError;
use coursetrack_shared::store::StoreError;
use thiserror::Error;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

pub const EMAIL_TAKEN: &str = "User with this email already exists";

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Unified API error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected input
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldViolation>,
    },

    /// Unique constraint, e.g. duplicate email
    #[error("{0}")]
    Conflict(String),

    /// Not authenticated or not authorized
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    /// The session store failed
    #[error("{0}")]
    Session(String),

    /// Unexpected failure; the payload is logged, never returned
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn validation(field: &str, message: &str) -> Self {
        InvalidInput::field(field, message).into()
    }

    /// Stable `extensions.code`
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Auth(_) => "AUTH_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Session(_) => "SESSION_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The message shown to clients
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Conflict(message)
            | ApiError::Auth(message)
            | ApiError::NotFound(message)
            | ApiError::Session(message) => message,
            ApiError::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        if let ApiError::Internal(cause) = self {
            tracing::error!(cause = %cause, "Internal error");
        }

        async_graphql::Error::new(self.message()).extend_with(|_, ext| {
            ext.set("code", self.code());

            if let ApiError::Validation { fields, .. } = self {
                if let Ok(value) = async_graphql::to_value(fields) {
                    ext.set("fields", value);
                }
            }
        })
    }
}

impl From<InvalidInput> for ApiError {
    fn from(err: InvalidInput) -> Self {
        ApiError::Validation {
            message: err.message,
            fields: err.fields,
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Auth(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        tracing::error!(error = %err, "Session store failure");
        ApiError::Session("Session store unavailable".to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { constraint } if constraint.contains("email") => {
                ApiError::Conflict(EMAIL_TAKEN.to_string())
            }
            StoreError::Conflict { constraint } => {
                ApiError::Conflict(format!("Constraint violation: {}", constraint))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
