//! Unified error type for the storefront backend.
//!
//! Service functions in [`crate::core`] return [`Result`]; the HTTP layer maps each
//! variant onto a status code in [`crate::api::response`].

use thiserror::Error;

/// All failures the application can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A referenced entity does not exist
    #[error("{entity} not found")]
    NotFound {
        /// Display name of the missing entity (e.g. "Product")
        entity: &'static str,
    },

    /// A uniqueness rule would be violated
    #[error("{message}")]
    Conflict {
        /// Description of the conflicting state
        message: String,
    },

    /// The request is well-formed but breaks a business rule
    #[error("{message}")]
    BadRequest {
        /// Description of the broken rule
        message: String,
    },

    /// The caller is authenticated but does not own the resource
    #[error("{message}")]
    Forbidden {
        /// Description of the ownership mismatch
        message: String,
    },

    /// Missing, invalid or expired credentials, or a role mismatch
    #[error("{message}")]
    Unauthorized {
        /// Description of the authentication failure
        message: String,
    },

    /// Input failed field validation
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Password hashing or verification failed internally
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Underlying error text
        message: String,
    },

    /// Token encoding failed
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Outbound email could not be sent
    #[error("Mail delivery error: {message}")]
    Mail {
        /// Underlying error text
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for [`Error::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

impl From<argon2::Error> for Error {
    fn from(value: argon2::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
