//! Reference resolution — composing the candidate set visible at a site.
//!
//! A scope is built from four layers, innermost to outermost: the
//! lexical layers from the document's local scopes, an import-qualified
//! layer of `prefix:name` spellings synthesized from the global index,
//! and the raw global layer of bracketed IRIs. Inner layers shadow
//! identically-spelled outer candidates. Composition is read-only; the
//! tree and the index are never mutated.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::{SmolStr, format_smolstr};
use tracing::trace;

use crate::base::{DocId, iri};
use crate::model::{Document, ExpectedType, MemberKind, RefId, RefSlot};
use super::exports::{ExportEntry, LocalScopes};
use super::index::SymbolIndex;

/// The ordered, deduplicated candidate set visible at one reference site.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    entries: IndexMap<SmolStr, ExportEntry>,
}

impl Scope {
    /// The candidate a spelling resolves to, if any.
    pub fn resolve(&self, text: &str) -> Option<&ExportEntry> {
        self.entries.get(text)
    }

    /// Every visible candidate, for completion collaborators.
    pub fn entries(&self) -> impl Iterator<Item = &ExportEntry> {
        self.entries.values()
    }

    /// Number of distinct spellings in scope.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the scope is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge one layer over the layers already present.
    ///
    /// Later layers are nearer the reference site: an entry here replaces
    /// an identically-spelled outer entry. Within the layer itself the
    /// first registration of a spelling wins.
    fn push_layer(&mut self, layer: impl IntoIterator<Item = ExportEntry>) {
        let mut seen = FxHashSet::default();
        for entry in layer {
            if seen.insert(entry.spelling.clone()) {
                self.entries.insert(entry.spelling.clone(), entry);
            }
        }
    }
}

/// Builds scopes against a shared symbol index.
pub struct ScopeProvider<'a> {
    index: &'a SymbolIndex,
}

impl<'a> ScopeProvider<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        Self { index }
    }

    /// The declared type(s) legal at a reference site.
    ///
    /// Two slots override their defaults: a super-term reference widens
    /// to the enclosing term's abstract supertype, and an import target
    /// is typed by the import compatibility matrix. `None` means the
    /// site could not be typed; such sites get an empty scope.
    pub fn expected_type_at(&self, document: &Document, site: RefId) -> Option<ExpectedType> {
        let reference = document.reference(site)?;
        match reference.slot {
            RefSlot::SuperTerm => {
                // The axiom's own member is the first hit on the chain;
                // the term being specialized is the one above it.
                let axiom = document.node(site.node)?;
                let enclosing = axiom
                    .parent
                    .and_then(|parent| document.enclosing_member(parent));
                match enclosing {
                    Some((_, member)) if member.kind.is_term() => Some(match member.kind {
                        MemberKind::Concept | MemberKind::RelationEntity => ExpectedType::Entity,
                        MemberKind::ForwardRelation | MemberKind::ReverseRelation => {
                            ExpectedType::Relation
                        }
                        kind => ExpectedType::exactly(kind),
                    }),
                    _ => reference.slot.default_expected(),
                }
            }
            RefSlot::ImportTarget => {
                let import = document.import(site.node)?;
                // An illegal (importer, kind) cell still gets the widest
                // ontology scope; rejecting it is the validator's job.
                Some(
                    document
                        .ontology()
                        .kind
                        .import_target(import.kind)
                        .unwrap_or(ExpectedType::Ontology),
                )
            }
            slot => slot.default_expected(),
        }
    }

    /// The candidate set visible at one reference site.
    pub fn scope_at(
        &self,
        doc_id: DocId,
        document: &Document,
        local_scopes: &LocalScopes,
        site: RefId,
    ) -> Scope {
        let Some(expected) = self.expected_type_at(document, site) else {
            trace!(%doc_id, ?site, "reference site could not be typed; empty scope");
            return Scope::default();
        };
        let is_import_target = document
            .reference(site)
            .is_some_and(|r| r.slot == RefSlot::ImportTarget);

        // Lexical layers, innermost container first.
        let mut lexical: Vec<Vec<ExportEntry>> = Vec::new();
        for container in document.ancestors(site.node) {
            let layer: Vec<_> = local_scopes
                .bindings(container)
                .iter()
                .filter(|entry| expected.admits(entry.kind))
                .cloned()
                .collect();
            if !layer.is_empty() {
                lexical.push(layer);
            }
        }

        let mut scope = Scope::default();
        scope.push_layer(self.index.all_elements(expected, None));

        // Import-qualified abbreviations sit between the global layer and
        // the lexical layers. Skipped for import targets: an import cannot
        // abbreviate through the prefixes it is itself introducing.
        if !is_import_target {
            scope.push_layer(self.abbreviated_layer(document, expected));
        }

        for layer in lexical.into_iter().rev() {
            scope.push_layer(layer);
        }

        trace!(%doc_id, ?site, ?expected, candidates = scope.len(), "composed scope");
        scope
    }

    /// Synthesize `prefix:name` candidates for every global element whose
    /// namespace one of the document's prefixed imports covers.
    fn abbreviated_layer(&self, document: &Document, expected: ExpectedType) -> Vec<ExportEntry> {
        let mut namespace_to_prefix: FxHashMap<&str, &str> = FxHashMap::default();
        for (node, import) in document.imports() {
            let Some(prefix) = import.prefix.as_deref() else {
                continue;
            };
            let Some(target) = document.import_target_text(node) else {
                continue;
            };
            // Last prefixed declaration of a namespace wins.
            namespace_to_prefix.insert(iri::strip_brackets(target), prefix);
        }
        if namespace_to_prefix.is_empty() {
            return Vec::new();
        }

        self.index
            .all_elements(expected, None)
            .into_iter()
            .filter_map(|entry| {
                let (namespace, local) = iri::split_bracketed(&entry.spelling)?;
                let prefix = namespace_to_prefix.get(namespace)?;
                Some(entry.respelled(format_smolstr!("{prefix}:{local}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::exports::{compute_exports, compute_local_scopes};
    use crate::hir::index::DocumentExports;
    use crate::model::{ImportKind, OntologyKind};
    use tokio_util::sync::CancellationToken;

    fn load(index: &SymbolIndex, doc_id: DocId, document: &Document) -> LocalScopes {
        let cancel = CancellationToken::new();
        let exports = compute_exports(doc_id, document, &cancel).unwrap();
        index.publish(DocumentExports::new(doc_id, document, exports));
        compute_local_scopes(doc_id, document, &cancel).unwrap()
    }

    fn description_b() -> Document {
        let mut b = Document::builder("mem:b.oml", OntologyKind::Description, "http://b#", "b");
        b.add_member(Document::ROOT, MemberKind::ConceptInstance, Some("X")).unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_super_term_widens_concept_to_entity() {
        let index = SymbolIndex::new();
        let mut b = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
        let concept = b.add_member(Document::ROOT, MemberKind::Concept, Some("C")).unwrap();
        let axiom = b.add_specialization(concept, "Base").unwrap();
        let doc = b.finish().unwrap();

        let provider = ScopeProvider::new(&index);
        let expected = provider.expected_type_at(&doc, RefId::new(axiom, 0));
        assert_eq!(expected, Some(ExpectedType::Entity));
    }

    #[test]
    fn test_super_term_of_forward_relation_is_relation() {
        let index = SymbolIndex::new();
        let mut b = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
        let entity = b
            .add_member(Document::ROOT, MemberKind::RelationEntity, Some("Owns"))
            .unwrap();
        let forward = b.add_member(entity, MemberKind::ForwardRelation, Some("owns")).unwrap();
        let axiom = b.add_specialization(forward, "base").unwrap();
        let doc = b.finish().unwrap();

        let provider = ScopeProvider::new(&index);
        let expected = provider.expected_type_at(&doc, RefId::new(axiom, 0));
        assert_eq!(expected, Some(ExpectedType::Relation));
    }

    #[test]
    fn test_super_term_of_scalar_is_exact() {
        let index = SymbolIndex::new();
        let mut b = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
        let scalar = b.add_member(Document::ROOT, MemberKind::Scalar, Some("s")).unwrap();
        let axiom = b.add_specialization(scalar, "base").unwrap();
        let doc = b.finish().unwrap();

        let provider = ScopeProvider::new(&index);
        let expected = provider.expected_type_at(&doc, RefId::new(axiom, 0));
        assert_eq!(expected, Some(ExpectedType::exactly(MemberKind::Scalar)));
    }

    #[test]
    fn test_import_target_typed_by_matrix() {
        let index = SymbolIndex::new();
        let mut b = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
        let uses = b.add_import(ImportKind::Uses, "<http://b#>", Some("b")).unwrap();
        let includes = b.add_import(ImportKind::Includes, "<http://c#>", None).unwrap();
        let doc = b.finish().unwrap();

        let provider = ScopeProvider::new(&index);
        assert_eq!(
            provider.expected_type_at(&doc, RefId::new(uses, 0)),
            Some(ExpectedType::exactly(OntologyKind::Description))
        );
        // Illegal cell falls back to any ontology; the validator rejects it.
        assert_eq!(
            provider.expected_type_at(&doc, RefId::new(includes, 0)),
            Some(ExpectedType::Ontology)
        );
    }

    #[test]
    fn test_untypable_site_gets_empty_scope() {
        let index = SymbolIndex::new();
        let mut b = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
        let m = b.add_member(Document::ROOT, MemberKind::Concept, Some("C")).unwrap();
        b.add_ref(m, RefSlot::Unknown, "whatever").unwrap();
        let doc = b.finish().unwrap();
        let local = load(&index, DocId::new(0), &doc);

        let provider = ScopeProvider::new(&index);
        let scope = provider.scope_at(DocId::new(0), &doc, &local, RefId::new(m, 0));
        assert!(scope.is_empty());
    }

    #[test]
    fn test_scope_layers_abbreviated_and_global() {
        let index = SymbolIndex::new();

        let doc_b = description_b();
        load(&index, DocId::new(1), &doc_b);

        let mut b = Document::builder("mem:a.oml", OntologyKind::Description, "http://a#", "a");
        b.add_import(ImportKind::Extends, "<http://b#>", Some("b")).unwrap();
        let r = b
            .add_member(Document::ROOT, MemberKind::RelationInstance, Some("r"))
            .unwrap();
        let site = b.add_ref(r, RefSlot::InstanceRef, "b:X").unwrap();
        let doc = b.finish().unwrap();
        let local = load(&index, DocId::new(0), &doc);

        let provider = ScopeProvider::new(&index);
        let scope = provider.scope_at(DocId::new(0), &doc, &local, site);

        // Local instance under bare and document-prefixed spellings,
        // imported instance under abbreviation and full IRI.
        assert!(scope.resolve("r").is_some());
        assert!(scope.resolve("a:r").is_some());
        assert!(scope.resolve("b:X").is_some());
        assert!(scope.resolve("<http://b#X>").is_some());
        assert!(scope.resolve("b:Y").is_none());
    }

    #[test]
    fn test_local_member_shadows_imported_spelling() {
        let index = SymbolIndex::new();

        // Document B exports a concept named C; document A imports B with
        // prefix "a" so the abbreviation collides with A's own "a:C".
        let mut b = Document::builder("mem:b.oml", OntologyKind::Vocabulary, "http://b#", "b");
        b.add_member(Document::ROOT, MemberKind::Concept, Some("C")).unwrap();
        let doc_b = b.finish().unwrap();
        load(&index, DocId::new(1), &doc_b);

        let mut a = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
        a.add_import(ImportKind::Extends, "<http://b#>", Some("a")).unwrap();
        let c = a.add_member(Document::ROOT, MemberKind::Concept, Some("C")).unwrap();
        let site = a.add_ref(c, RefSlot::SuperTerm, "a:C").unwrap();
        let doc_a = a.finish().unwrap();
        let local = load(&index, DocId::new(0), &doc_a);

        let provider = ScopeProvider::new(&index);
        let scope = provider.scope_at(DocId::new(0), &doc_a, &local, site);

        let winner = scope.resolve("a:C").unwrap();
        assert_eq!(winner.doc, DocId::new(0), "lexical binding must shadow the import");
        assert_eq!(winner.node, c);
    }

    #[test]
    fn test_import_target_scope_skips_abbreviations() {
        let index = SymbolIndex::new();
        let doc_b = description_b();
        load(&index, DocId::new(1), &doc_b);

        let mut a = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
        let import = a.add_import(ImportKind::Uses, "<http://b#>", Some("b")).unwrap();
        let doc_a = a.finish().unwrap();
        let local = load(&index, DocId::new(0), &doc_a);

        let provider = ScopeProvider::new(&index);
        let scope = provider.scope_at(DocId::new(0), &doc_a, &local, RefId::new(import, 0));

        assert!(scope.resolve("<http://b#>").is_some());
        assert!(
            scope.entries().all(|e| !e.spelling.contains(':') || e.spelling.starts_with('<')),
            "import target scopes must not contain prefix abbreviations"
        );
    }

    #[test]
    fn test_last_prefixed_import_wins_per_namespace() {
        let index = SymbolIndex::new();
        let doc_b = description_b();
        load(&index, DocId::new(1), &doc_b);

        let mut a = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
        a.add_import(ImportKind::Uses, "<http://b#>", Some("first")).unwrap();
        a.add_import(ImportKind::Uses, "<http://b#>", Some("second")).unwrap();
        let c = a.add_member(Document::ROOT, MemberKind::Concept, Some("C")).unwrap();
        let site = a.add_ref(c, RefSlot::InstanceRef, "second:X").unwrap();
        let doc_a = a.finish().unwrap();
        let local = load(&index, DocId::new(0), &doc_a);

        let provider = ScopeProvider::new(&index);
        let scope = provider.scope_at(DocId::new(0), &doc_a, &local, site);

        assert!(scope.resolve("second:X").is_some());
        assert!(scope.resolve("first:X").is_none());
    }
}
