//! DQL console core.
//!
//! Query dispatch and schema synchronization for an interactive graph database client:
//! composes query, mutate and alter requests, turns schema introspection into schema
//! text, and keeps each open document paired with its last result.

pub mod auth;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod endpoint;
pub mod errors;
pub mod models;
pub mod schema;
pub mod session;

pub use config::{Config, ConnectionConfig, ConnectionSource, SharedConnection};
pub use dispatch::{Classification, Dispatched, Dispatcher, QueryOutcome};
pub use errors::{DispatchError, DispatchFailure, SettingsError};
pub use models::{
    AlterOp, DocumentId, DocumentKind, MutateOp, Operation, OperationKind, QueryOp, RawResponse,
    TabContent,
};
pub use session::{InMemorySessionStore, SessionStore};
