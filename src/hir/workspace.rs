//! Workspace orchestration.
//!
//! One [`Workspace`] per set of interdependent documents. Loading a
//! document runs the per-document pipeline (exports, local scopes) and
//! publishes into the shared index only once everything computed; a
//! cancelled load leaves prior state untouched. Queries (`scope_at`,
//! `resolve_at`, `all_elements`) are read-only.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::base::DocId;
use crate::model::{Document, ExpectedType, RefId};
use super::diagnostics::Diagnostic;
use super::exports::{ExportEntry, compute_exports, compute_local_scopes};
use super::index::{DocumentExports, SymbolIndex};
use super::scope::{Scope, ScopeProvider};
use super::store::{DocumentState, DocumentStore};
use super::validate;

/// Errors from loading a document into a workspace.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("document processing was cancelled")]
    Cancelled,
    #[error("namespace '{namespace}' is already declared by '{existing_uri}'")]
    DuplicateNamespace {
        namespace: SmolStr,
        existing_uri: SmolStr,
    },
}

/// A set of loaded documents sharing one symbol index.
#[derive(Debug, Default)]
pub struct Workspace {
    store: DocumentStore,
    index: SymbolIndex,
}

impl Workspace {
    /// Create a new empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load or reload a document.
    ///
    /// Exports and local scopes are computed first; only then is the
    /// document's index contribution swapped, so readers never observe a
    /// half-loaded document and a cancelled load changes nothing.
    pub fn load_document(
        &self,
        document: Document,
        cancel: &CancellationToken,
    ) -> Result<DocId, LoadError> {
        let doc_id = self.store.doc_id(document.uri());

        let namespace = document.namespace();
        if !namespace.is_empty()
            && let Some(existing) = self.index.ontology_by_namespace(namespace)
            && existing.doc != doc_id
        {
            return Err(LoadError::DuplicateNamespace {
                namespace: SmolStr::from(namespace),
                existing_uri: existing.uri.clone(),
            });
        }

        let exports = compute_exports(doc_id, &document, cancel).ok_or(LoadError::Cancelled)?;
        let local_scopes =
            compute_local_scopes(doc_id, &document, cancel).ok_or(LoadError::Cancelled)?;

        let snapshot = DocumentExports::new(doc_id, &document, exports);
        self.store.insert(
            doc_id,
            DocumentState {
                document: Arc::new(document),
                local_scopes: Arc::new(local_scopes),
            },
        );
        self.index.publish(snapshot);
        debug!(%doc_id, "loaded document");
        Ok(doc_id)
    }

    /// Unload a document, retracting its exports. Returns whether it was
    /// loaded.
    pub fn remove_document(&self, uri: &str) -> bool {
        let Some(doc_id) = self.store.lookup(uri) else {
            return false;
        };
        let removed = self.store.remove(doc_id).is_some();
        self.index.retract(doc_id);
        if removed {
            debug!(%doc_id, uri, "removed document");
        }
        removed
    }

    /// The candidate set visible at a reference site of a loaded document.
    pub fn scope_at(&self, doc: DocId, site: RefId) -> Option<Scope> {
        let state = self.store.state(doc)?;
        let provider = ScopeProvider::new(&self.index);
        Some(provider.scope_at(doc, &state.document, &state.local_scopes, site))
    }

    /// Resolve one reference site to its declaration, if any.
    pub fn resolve_at(&self, doc: DocId, site: RefId) -> Option<ExportEntry> {
        let state = self.store.state(doc)?;
        let text = state.document.reference(site)?.text.clone();
        self.scope_at(doc, site)?.resolve(&text).cloned()
    }

    /// Validate one loaded document. `None` if unloaded or cancelled.
    pub fn check(&self, doc: DocId, cancel: &CancellationToken) -> Option<Vec<Diagnostic>> {
        let state = self.store.state(doc)?;
        validate::check_document(doc, &state.document, &state.local_scopes, &self.index, cancel)
    }

    /// Global lookup of exported elements by declared type.
    pub fn all_elements(
        &self,
        expected: ExpectedType,
        docs: Option<&FxHashSet<DocId>>,
    ) -> Vec<ExportEntry> {
        self.index.all_elements(expected, docs)
    }

    /// The id assigned to a URI, if the URI was ever loaded.
    pub fn doc_id(&self, uri: &str) -> Option<DocId> {
        self.store.lookup(uri)
    }

    /// The store of loaded documents.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The shared symbol index.
    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }
}
