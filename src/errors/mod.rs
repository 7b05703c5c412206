//! Error handling module for the DQL console.
//!
//! Provides centralized error types for dispatch and settings persistence, with stable
//! string codes the calling UI can match on.

use crate::models::OperationKind;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const MALFORMED_RESPONSE: &str = "MALFORMED_RESPONSE";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
}

/// Why a dispatch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchFailure {
    /// Connection or transport failure (including requests that could not be built)
    Network(String),
    /// The endpoint answered with a non-2xx status
    Http { status: u16, body: String },
    /// The response did not have the shape the classification rule required
    MalformedResponse(String),
}

/// A failed dispatch, tagged with the operation that was being sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    pub operation: OperationKind,
    pub cause: DispatchFailure,
}

impl DispatchError {
    pub fn new(operation: OperationKind, cause: DispatchFailure) -> Self {
        Self { operation, cause }
    }

    pub fn network(operation: OperationKind, message: impl Into<String>) -> Self {
        Self::new(operation, DispatchFailure::Network(message.into()))
    }

    pub fn http(operation: OperationKind, status: u16, body: impl Into<String>) -> Self {
        Self::new(
            operation,
            DispatchFailure::Http {
                status,
                body: body.into(),
            },
        )
    }

    pub fn malformed(operation: OperationKind, message: impl Into<String>) -> Self {
        Self::new(operation, DispatchFailure::MalformedResponse(message.into()))
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match &self.cause {
            DispatchFailure::Network(_) => codes::NETWORK_ERROR,
            DispatchFailure::Http { .. } => codes::HTTP_ERROR,
            DispatchFailure::MalformedResponse(_) => codes::MALFORMED_RESPONSE,
        }
    }

    /// HTTP status of the failed response, if the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match &self.cause {
            DispatchFailure::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match &self.cause {
            DispatchFailure::Network(msg) => msg.clone(),
            DispatchFailure::Http { status, body } if body.is_empty() => {
                format!("HTTP {}", status)
            }
            DispatchFailure::Http { status, body } => format!("HTTP {}: {}", status, body),
            DispatchFailure::MalformedResponse(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} during {}: {}",
            self.error_code(),
            self.operation,
            self.message()
        )
    }
}

impl std::error::Error for DispatchError {}

/// Settings persistence error type.
#[derive(Debug)]
pub enum SettingsError {
    /// Database error
    Database(String),
    /// Stored value could not be (de)serialized
    Serialization(String),
}

impl SettingsError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            SettingsError::Database(_) => codes::DATABASE_ERROR,
            SettingsError::Serialization(_) => codes::SERIALIZATION_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            SettingsError::Database(msg) => msg.clone(),
            SettingsError::Serialization(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for SettingsError {}

impl From<sqlx::Error> for SettingsError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        SettingsError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        SettingsError::Serialization(format!("JSON error: {}", err))
    }
}
