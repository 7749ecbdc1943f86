//! Export table and local scope computation.
//!
//! Both passes are pure functions of one document tree and are re-run
//! from scratch whenever the document is reloaded; [`compute_exports`]
//! feeds the global [`SymbolIndex`](super::SymbolIndex) while
//! [`compute_local_scopes`] stays document-private. Both check the
//! cancellation token per node and return `None` when cancelled, so a
//! cancelled pass never publishes partial state.

use rustc_hash::FxHashMap;
use smol_str::{SmolStr, format_smolstr};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::base::{DocId, TextRange, iri};
use crate::model::{Document, ElementKind, NodeId, NodeKind};

/// One externally-visible or locally-visible binding: a spelling plus
/// the declaration it denotes.
///
/// Several entries may denote the same node under different spellings
/// (full bracketed IRI, `prefix:name`, bare name); they are views of one
/// declaration, not duplicates.
#[derive(Clone, Debug)]
pub struct ExportEntry {
    /// The spelling a reference must use to hit this entry
    pub spelling: SmolStr,
    /// The declaration's concrete declared type
    pub kind: ElementKind,
    /// The owning document
    pub doc: DocId,
    /// The declaration node within that document
    pub node: NodeId,
    /// The node's source range, when recorded
    pub span: Option<TextRange>,
}

impl ExportEntry {
    /// The same declaration under a different spelling.
    pub fn respelled(&self, spelling: SmolStr) -> Self {
        Self {
            spelling,
            ..self.clone()
        }
    }
}

/// Compute a document's export table.
///
/// The ontology root exports under its bracketed namespace; every named
/// member exports under its bracketed full IRI. A document without a
/// namespace exports nothing for the root, and its members are skipped
/// (recoverable, not an error). Returns `None` if cancelled.
pub fn compute_exports(
    doc_id: DocId,
    document: &Document,
    cancel: &CancellationToken,
) -> Option<Vec<ExportEntry>> {
    let namespace = document.namespace();
    let mut exports = Vec::new();

    for (node_id, node) in document.nodes() {
        if cancel.is_cancelled() {
            return None;
        }
        match &node.kind {
            NodeKind::Ontology => {
                if namespace.is_empty() {
                    trace!(uri = document.uri(), "skipping export of ontology without namespace");
                    continue;
                }
                exports.push(ExportEntry {
                    spelling: iri::bracket(namespace),
                    kind: document.ontology().kind.into(),
                    doc: doc_id,
                    node: node_id,
                    span: node.span,
                });
            }
            NodeKind::Member(member) => {
                let Some(name) = member.name.as_deref() else {
                    continue;
                };
                if namespace.is_empty() {
                    trace!(uri = document.uri(), name, "skipping export of member without namespace");
                    continue;
                }
                exports.push(ExportEntry {
                    spelling: iri::bracket(&iri::join_iri(namespace, name)),
                    kind: member.kind.into(),
                    doc: doc_id,
                    node: node_id,
                    span: node.span,
                });
            }
            _ => {}
        }
    }

    Some(exports)
}

/// Per-container name bindings reachable without any cross-document
/// lookup.
#[derive(Clone, Debug, Default)]
pub struct LocalScopes {
    scopes: FxHashMap<NodeId, Vec<ExportEntry>>,
}

impl LocalScopes {
    /// The bindings registered on one container node.
    pub fn bindings(&self, container: NodeId) -> &[ExportEntry] {
        self.scopes.get(&container).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of bindings across all containers.
    pub fn len(&self) -> usize {
        self.scopes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(Vec::is_empty)
    }
}

/// Compute a document's local scopes.
///
/// Every named member is registered on the root ontology container under
/// its bare name and, when the document declares a prefix, under
/// `prefix:name`. Returns `None` if cancelled.
pub fn compute_local_scopes(
    doc_id: DocId,
    document: &Document,
    cancel: &CancellationToken,
) -> Option<LocalScopes> {
    let prefix = document.prefix();
    let mut bindings = Vec::new();

    for (node_id, node) in document.nodes() {
        if cancel.is_cancelled() {
            return None;
        }
        let NodeKind::Member(member) = &node.kind else {
            continue;
        };
        let Some(name) = member.name.as_deref() else {
            continue;
        };
        let entry = ExportEntry {
            spelling: SmolStr::from(name),
            kind: member.kind.into(),
            doc: doc_id,
            node: node_id,
            span: node.span,
        };
        let prefixed =
            (!prefix.is_empty()).then(|| entry.respelled(format_smolstr!("{prefix}:{name}")));
        bindings.push(entry);
        bindings.extend(prefixed);
    }

    let mut scopes = FxHashMap::default();
    scopes.insert(Document::ROOT, bindings);
    Some(LocalScopes { scopes })
}
