//! Schema codec.
//!
//! Decodes schema introspection responses into the textual schema language and holds the
//! editing rules for individual predicate declarations.

pub mod codec;
mod model;
pub mod rules;

pub use codec::{decode, render};
pub use model::*;
pub use rules::{RuleViolation, ValueType};

/// A response that could not be read as a schema introspection payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed schema response: {}", self.message)
    }
}

impl std::error::Error for DecodeError {}
