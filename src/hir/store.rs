//! Document store — stable ids and loaded-document state.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;

use crate::base::DocId;
use crate::model::Document;
use super::exports::LocalScopes;

/// A loaded document together with its computed local scopes.
#[derive(Clone, Debug)]
pub struct DocumentState {
    pub document: Arc<Document>,
    pub local_scopes: Arc<LocalScopes>,
}

/// Manages the mapping between document URIs and [`DocId`]s.
///
/// Ids are assigned once per URI and stay stable across reloads, so
/// index snapshots and diagnostics keep pointing at the same document
/// identity when its content changes.
#[derive(Debug, Default)]
pub struct DocumentStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// URI → DocId mapping
    uri_to_id: IndexMap<SmolStr, DocId>,
    /// DocId → URI mapping (reverse lookup)
    id_to_uri: IndexMap<DocId, SmolStr>,
    /// DocId → loaded state
    states: IndexMap<DocId, DocumentState>,
    /// Next DocId to assign
    next_id: u32,
}

impl DocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a [`DocId`] for a URI.
    pub fn doc_id(&self, uri: &str) -> DocId {
        // Fast path: read lock
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.uri_to_id.get(uri) {
                return id;
            }
        }

        // Slow path: write lock
        let mut inner = self.inner.write();

        // Double-check
        if let Some(&id) = inner.uri_to_id.get(uri) {
            return id;
        }

        let id = DocId::new(inner.next_id);
        inner.next_id += 1;
        inner.uri_to_id.insert(SmolStr::from(uri), id);
        inner.id_to_uri.insert(id, SmolStr::from(uri));
        id
    }

    /// The id already assigned to a URI, if any.
    pub fn lookup(&self, uri: &str) -> Option<DocId> {
        self.inner.read().uri_to_id.get(uri).copied()
    }

    /// Get the URI for a [`DocId`].
    pub fn uri(&self, doc: DocId) -> Option<SmolStr> {
        self.inner.read().id_to_uri.get(&doc).cloned()
    }

    /// Replace the loaded state of a document.
    pub fn insert(&self, doc: DocId, state: DocumentState) {
        self.inner.write().states.insert(doc, state);
    }

    /// Get the loaded state of a document.
    pub fn state(&self, doc: DocId) -> Option<DocumentState> {
        self.inner.read().states.get(&doc).cloned()
    }

    /// Drop a document's loaded state. The id stays assigned.
    pub fn remove(&self, doc: DocId) -> Option<DocumentState> {
        self.inner.write().states.shift_remove(&doc)
    }

    /// Ids of all currently loaded documents.
    pub fn loaded(&self) -> Vec<DocId> {
        self.inner.read().states.keys().copied().collect()
    }

    /// Number of loaded documents.
    pub fn len(&self) -> usize {
        self.inner.read().states.len()
    }

    /// Check if no documents are loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
