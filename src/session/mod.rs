//! Document session store.
//!
//! The dispatcher only ever sees the [`SessionStore`] capability; opening and closing
//! documents belongs to the editor shell.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::{DocumentId, DocumentKind, TabContent};

/// Write access to per-document state, keyed by document id.
pub trait SessionStore: Send + Sync {
    /// Record the committed text and the last result for a document.
    fn update(&self, document_id: DocumentId, committed_text: &str, result_text: &str);
}

/// Session store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    documents: RwLock<HashMap<DocumentId, TabContent>>,
    order: RwLock<Vec<DocumentId>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new document and return its id.
    pub fn open(&self, kind: DocumentKind, text: impl Into<String>) -> DocumentId {
        let id = DocumentId::new();
        let content = TabContent::new(id, kind, text);
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, content);
        self.order
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(id);
        tracing::debug!("Opened {:?} document {}", kind, id);
        id
    }

    pub fn get(&self, document_id: DocumentId) -> Option<TabContent> {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&document_id)
            .cloned()
    }

    /// Close a document, returning its final content.
    pub fn close(&self, document_id: DocumentId) -> Option<TabContent> {
        self.order
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|id| *id != document_id);
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&document_id)
    }

    /// Open documents, in the order they were opened.
    pub fn documents(&self) -> Vec<TabContent> {
        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        self.order
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|id| documents.get(id).cloned())
            .collect()
    }

    /// Replace a document's text as the user edits it.
    pub fn edit(&self, document_id: DocumentId, text: impl Into<String>) -> bool {
        match self
            .documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&document_id)
        {
            Some(content) => {
                content.committed_text = text.into();
                true
            }
            None => false,
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn update(&self, document_id: DocumentId, committed_text: &str, result_text: &str) {
        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        match documents.get_mut(&document_id) {
            Some(content) => {
                content.committed_text = committed_text.to_string();
                content.last_result_text = Some(result_text.to_string());
            }
            None => tracing::warn!("Ignoring update for unknown document {}", document_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_update() {
        let store = InMemorySessionStore::new();
        let id = store.open(DocumentKind::Query, "{ q(func: uid(0x1)) { uid } }");

        store.update(id, "{ other }", "{\"data\":{}}");

        let content = store.get(id).unwrap();
        assert_eq!(content.committed_text, "{ other }");
        assert_eq!(content.last_result_text.as_deref(), Some("{\"data\":{}}"));
    }

    #[test]
    fn test_update_unknown_document_is_ignored() {
        let store = InMemorySessionStore::new();
        let id = store.open(DocumentKind::Schema, "");
        store.close(id);

        store.update(id, "text", "result");
        assert!(store.get(id).is_none());
        assert!(store.documents().is_empty());
    }

    #[test]
    fn test_documents_keep_open_order() {
        let store = InMemorySessionStore::new();
        let a = store.open(DocumentKind::Query, "a");
        let b = store.open(DocumentKind::Mutation, "b");
        let c = store.open(DocumentKind::Schema, "c");
        store.close(b);

        let ids: Vec<_> = store.documents().iter().map(|d| d.document_id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_edit_does_not_touch_result() {
        let store = InMemorySessionStore::new();
        let id = store.open(DocumentKind::Query, "");
        store.update(id, "q1", "r1");

        assert!(store.edit(id, "q2"));
        let content = store.get(id).unwrap();
        assert_eq!(content.committed_text, "q2");
        assert_eq!(content.last_result_text.as_deref(), Some("r1"));
        assert!(!store.edit(DocumentId::new(), "x"));
    }
}
