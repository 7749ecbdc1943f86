//! Document validation.
//!
//! One pass per document: resolve every reference through the scope
//! provider, then run the import-compatibility, cross-reference,
//! unused-prefix, and unique-facet checks. Each finding is a
//! [`Diagnostic`]; nothing here throws past a check's boundary. The
//! whole pass is cooperative — it checks the cancellation token at node
//! boundaries and returns `None` when cancelled.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::base::{DocId, iri};
use crate::model::{Document, ElementKind, NodeKind, RefSlot};
use super::diagnostics::{Diagnostic, DiagnosticCollector};
use super::exports::LocalScopes;
use super::index::SymbolIndex;
use super::scope::ScopeProvider;

/// Validate one document against the current index state.
///
/// Returns `None` if cancelled; no diagnostics are reported for a
/// cancelled pass.
pub fn check_document(
    doc_id: DocId,
    document: &Document,
    local_scopes: &LocalScopes,
    index: &SymbolIndex,
    cancel: &CancellationToken,
) -> Option<Vec<Diagnostic>> {
    let mut collector = DiagnosticCollector::new();

    check_resolution(doc_id, document, local_scopes, index, cancel, &mut collector)?;
    check_valid_imports(doc_id, document, index, cancel, &mut collector)?;
    check_imported_cross_references(doc_id, document, index, cancel, &mut collector)?;
    check_unused_imports(doc_id, document, cancel, &mut collector)?;
    check_unique_facets(doc_id, document, cancel, &mut collector)?;

    debug!(
        %doc_id,
        errors = collector.error_count(),
        warnings = collector.warning_count(),
        "validated document"
    );
    Some(collector.take())
}

/// Resolve every reference in the document; one diagnostic per miss.
fn check_resolution(
    doc_id: DocId,
    document: &Document,
    local_scopes: &LocalScopes,
    index: &SymbolIndex,
    cancel: &CancellationToken,
    collector: &mut DiagnosticCollector,
) -> Option<()> {
    let provider = ScopeProvider::new(index);
    for (site, reference) in document.refs() {
        if cancel.is_cancelled() {
            return None;
        }
        // An import target is resolved as soon as its namespace is loaded;
        // a wrong-kind target is the validator's finding, not a second
        // unresolved-reference error.
        let resolved = if reference.slot == RefSlot::ImportTarget {
            index.resolve_import(document, site.node).is_some()
        } else {
            let scope = provider.scope_at(doc_id, document, local_scopes, site);
            scope.resolve(&reference.text).is_some()
        };
        if !resolved {
            let span = document.node(site.node).and_then(|n| n.span);
            collector.unresolved_reference(
                doc_id,
                site.node,
                reference.slot.property_name(),
                span,
                &reference.text,
            );
        }
    }
    Some(())
}

/// Check every import's (kind, target kind) pair against the matrix.
///
/// An import whose target is not loaded is skipped; the resolution pass
/// already reported the unresolved reference. Exactly one diagnostic is
/// emitted per violating import.
pub fn check_valid_imports(
    doc_id: DocId,
    document: &Document,
    index: &SymbolIndex,
    cancel: &CancellationToken,
    collector: &mut DiagnosticCollector,
) -> Option<()> {
    let importer = document.ontology().kind;
    for (node, import) in document.imports() {
        if cancel.is_cancelled() {
            return None;
        }
        let Some(target) = index.resolve_import(document, node) else {
            continue;
        };
        let span = document.node(node).and_then(|n| n.span);
        match importer.import_target(import.kind) {
            None => {
                collector.import_kind_mismatch(
                    doc_id,
                    node,
                    span,
                    format!(
                        "a {} cannot declare a '{}' import; {}",
                        importer,
                        import.kind,
                        importer.legal_imports()
                    ),
                );
            }
            Some(expected) if !expected.admits(ElementKind::Ontology(target.kind)) => {
                collector.import_kind_mismatch(
                    doc_id,
                    node,
                    span,
                    format!(
                        "a {} can declare '{}' only towards a {} ({} found)",
                        importer, import.kind, expected, target.kind
                    ),
                );
            }
            Some(_) => {}
        }
    }
    Some(())
}

/// Check that every bracketed cross-reference is covered by the
/// document's own namespace or a resolved import.
///
/// Import-target references are exempt: an import declaration is what
/// introduces a namespace in the first place.
pub fn check_imported_cross_references(
    doc_id: DocId,
    document: &Document,
    index: &SymbolIndex,
    cancel: &CancellationToken,
    collector: &mut DiagnosticCollector,
) -> Option<()> {
    let mut imported: FxHashSet<SmolStr> = FxHashSet::default();
    for (node, _) in document.imports() {
        if let Some(target) = index.resolve_import(document, node) {
            imported.insert(target.namespace.clone());
        }
    }

    for (site, reference) in document.refs() {
        if cancel.is_cancelled() {
            return None;
        }
        if reference.slot == RefSlot::ImportTarget || !iri::is_bracketed(&reference.text) {
            continue;
        }
        let covered = match iri::split_bracketed(&reference.text) {
            Some((namespace, _)) => {
                namespace == document.namespace() || imported.contains(namespace)
            }
            // No separator at all, so no namespace can cover it.
            None => false,
        };
        if !covered {
            let span = document.node(site.node).and_then(|n| n.span);
            collector.missing_import(
                doc_id,
                site.node,
                reference.slot.property_name(),
                span,
                &reference.text,
            );
        }
    }
    Some(())
}

/// Warn about declared import prefixes no reference ever uses.
pub fn check_unused_imports(
    doc_id: DocId,
    document: &Document,
    cancel: &CancellationToken,
    collector: &mut DiagnosticCollector,
) -> Option<()> {
    let mut used: FxHashSet<&str> = FxHashSet::default();
    for (_, reference) in document.refs() {
        if cancel.is_cancelled() {
            return None;
        }
        let text = reference.text.as_str();
        if !iri::is_bracketed(text)
            && let Some(colon) = text.find(':')
        {
            used.insert(&text[..colon]);
        }
    }

    for (node, import) in document.imports() {
        let Some(prefix) = import.prefix.as_deref() else {
            continue;
        };
        if !used.contains(prefix) {
            let span = document.node(node).and_then(|n| n.span);
            collector.unused_prefix(doc_id, node, span, prefix);
        }
    }
    Some(())
}

/// Check that no scalar-equivalence axiom repeats a facet property.
///
/// The grammar cannot express at-most-once within an unordered group, so
/// the check lives here; one diagnostic per duplicated property.
pub fn check_unique_facets(
    doc_id: DocId,
    document: &Document,
    cancel: &CancellationToken,
    collector: &mut DiagnosticCollector,
) -> Option<()> {
    for (node_id, node) in document.nodes() {
        if cancel.is_cancelled() {
            return None;
        }
        let NodeKind::ScalarEquivalence { facets } = &node.kind else {
            continue;
        };
        let mut counts = FxHashMap::default();
        for facet in facets {
            *counts.entry(facet.property).or_insert(0u32) += 1;
        }
        for facet in facets {
            // Report once, at the property's first occurrence.
            if counts.remove(&facet.property).is_some_and(|n| n > 1) {
                collector.duplicate_facet(doc_id, node_id, node.span, facet.property.name());
            }
        }
    }
    Some(())
}
