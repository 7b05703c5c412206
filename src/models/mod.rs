//! Data models for the DQL console.
//!
//! Field names follow the database's wire format (camelCase) for seamless interoperability.

mod document;
mod operation;
mod response;

pub use document::*;
pub use operation::*;
pub use response::*;
