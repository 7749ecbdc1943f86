//! Global symbol index.
//!
//! An arena of per-document export snapshots behind one `RwLock`.
//! Publishing a document swaps its whole snapshot; readers clone the
//! `Arc` handles under the read lock and filter lock-free, so they see
//! either a document's old table or its new one, never a mix.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{DocId, iri};
use crate::model::{Document, ExpectedType, NodeId, OntologyKind};
use super::exports::ExportEntry;

/// One document's complete export contribution.
#[derive(Clone, Debug)]
pub struct DocumentExports {
    pub doc: DocId,
    pub uri: SmolStr,
    pub namespace: SmolStr,
    pub prefix: SmolStr,
    pub kind: OntologyKind,
    pub entries: Vec<ExportEntry>,
}

impl DocumentExports {
    /// Bundle a computed export table with its document's identity.
    pub fn new(doc: DocId, document: &Document, entries: Vec<ExportEntry>) -> Self {
        Self {
            doc,
            uri: SmolStr::from(document.uri()),
            namespace: SmolStr::from(document.namespace()),
            prefix: SmolStr::from(document.prefix()),
            kind: document.ontology().kind,
            entries,
        }
    }
}

/// The process-wide symbol index.
///
/// Snapshots are keyed by [`DocId`] in publication order, which keeps
/// query results deterministic across identical workspaces.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    docs: RwLock<IndexMap<DocId, Arc<DocumentExports>>>,
}

impl SymbolIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a document's export contribution atomically.
    pub fn publish(&self, exports: DocumentExports) {
        let doc = exports.doc;
        let count = exports.entries.len();
        self.docs.write().insert(doc, Arc::new(exports));
        debug!(%doc, entries = count, "published export snapshot");
    }

    /// Remove a document's export contribution.
    pub fn retract(&self, doc: DocId) -> Option<Arc<DocumentExports>> {
        let removed = self.docs.write().shift_remove(&doc);
        if removed.is_some() {
            debug!(%doc, "retracted export snapshot");
        }
        removed
    }

    /// The current snapshot of one document, if loaded.
    pub fn snapshot(&self, doc: DocId) -> Option<Arc<DocumentExports>> {
        self.docs.read().get(&doc).cloned()
    }

    /// Snapshot handles for every loaded document, in publication order.
    pub fn snapshots(&self) -> Vec<Arc<DocumentExports>> {
        self.docs.read().values().cloned().collect()
    }

    /// All exported elements admitted by `expected`, optionally restricted
    /// to a set of documents.
    pub fn all_elements(
        &self,
        expected: ExpectedType,
        docs: Option<&FxHashSet<DocId>>,
    ) -> Vec<ExportEntry> {
        let snapshots = self.snapshots();
        snapshots
            .iter()
            .filter(|snap| docs.is_none_or(|set| set.contains(&snap.doc)))
            .flat_map(|snap| snap.entries.iter())
            .filter(|entry| expected.admits(entry.kind))
            .cloned()
            .collect()
    }

    /// The loaded ontology declaring `namespace`, if any.
    pub fn ontology_by_namespace(&self, namespace: &str) -> Option<Arc<DocumentExports>> {
        if namespace.is_empty() {
            return None;
        }
        self.docs
            .read()
            .values()
            .find(|snap| snap.namespace == namespace)
            .cloned()
    }

    /// Resolve an import node's target against currently loaded documents.
    ///
    /// The target text must be the bracketed-namespace form; anything else
    /// resolves to nothing. Looked up per query, never cached, so a
    /// reloaded target is picked up immediately.
    pub fn resolve_import(
        &self,
        document: &Document,
        import_node: NodeId,
    ) -> Option<Arc<DocumentExports>> {
        let target = document.import_target_text(import_node)?;
        if !iri::is_bracketed(target) {
            return None;
        }
        self.ontology_by_namespace(iri::strip_brackets(target))
    }

    /// Number of loaded documents.
    pub fn doc_count(&self) -> usize {
        self.docs.read().len()
    }

    /// Whether a document currently contributes exports.
    pub fn contains(&self, doc: DocId) -> bool {
        self.docs.read().contains_key(&doc)
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}
