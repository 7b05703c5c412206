//! Document (tab) model shared with the editor shell.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an open document. Ids are never reused or aliased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What a document is used to author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentKind {
    #[default]
    Query,
    Mutation,
    Schema,
}

/// A document's committed text paired with the result of its last operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabContent {
    pub document_id: DocumentId,
    pub kind: DocumentKind,
    pub committed_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_result_text: Option<String>,
}

impl TabContent {
    pub fn new(document_id: DocumentId, kind: DocumentKind, text: impl Into<String>) -> Self {
        Self {
            document_id,
            kind,
            committed_text: text.into(),
            last_result_text: None,
        }
    }
}
