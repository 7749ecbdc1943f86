//! Property-based tests for the IRI algebra and scope shadowing.
//!
//! Uses proptest to generate namespaces ending in `#`/`/` and local
//! names free of both separators, then checks the split/join round-trip
//! laws and that lexical bindings always shadow import-synthesized
//! spellings, for arbitrary names.
#![cfg(feature = "proptest")]

use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

use oml::base::iri;
use oml::{Document, ImportKind, MemberKind, OntologyKind, RefSlot, Workspace};

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Strategy for namespaces: a scheme, some path segments, and a final
/// `#` or `/` separator.
fn arb_namespace() -> impl Strategy<Value = String> {
    "[a-z]{2,6}://[a-z]{1,10}(\\.[a-z]{2,4})?(/[a-z0-9]{1,8}){0,3}[#/]"
}

/// Strategy for local names: no `#`, no `/`, no `:`.
fn arb_local_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_.-]{0,20}"
}

/// Strategy for document prefixes.
fn arb_prefix() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn split_join_round_trip(ns in arb_namespace(), name in arb_local_name()) {
        let joined = iri::join_iri(&ns, &name);
        let (split_ns, split_name) = iri::split_iri(&joined);
        prop_assert_eq!(split_ns, ns.as_str());
        prop_assert_eq!(split_name, name.as_str());
    }

    #[test]
    fn namespace_keeps_its_separator(ns in arb_namespace()) {
        prop_assert!(iri::is_valid_namespace(&ns));
        let (split_ns, rest) = iri::split_iri(&ns);
        prop_assert_eq!(split_ns, ns.as_str());
        prop_assert_eq!(rest, "");
    }

    #[test]
    fn bracket_strip_round_trip(ns in arb_namespace(), name in arb_local_name()) {
        let full = iri::join_iri(&ns, &name);
        let bracketed = iri::bracket(&full);
        prop_assert!(iri::is_bracketed(&bracketed));
        prop_assert_eq!(iri::strip_brackets(&bracketed), full.as_str());
    }

    #[test]
    fn split_bracketed_matches_split_iri(ns in arb_namespace(), name in arb_local_name()) {
        let bracketed = iri::bracket(&iri::join_iri(&ns, &name));
        let (split_ns, split_name) = iri::split_bracketed(&bracketed).unwrap();
        prop_assert_eq!(split_ns, ns.as_str());
        prop_assert_eq!(split_name, name.as_str());
    }

    #[test]
    fn separator_free_text_has_no_namespace(name in arb_local_name()) {
        prop_assert_eq!(iri::split_iri(&name), ("", name.as_str()));
        let bracketed = iri::bracket(&name);
        prop_assert_eq!(iri::split_bracketed(&bracketed), None);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A document-local member always shadows an identically-spelled
    /// abbreviation synthesized from an import, whatever the names.
    #[test]
    fn local_binding_shadows_import(prefix in arb_prefix(), name in arb_local_name()) {
        let ws = Workspace::new();
        let cancel = CancellationToken::new();

        let mut b = Document::builder("mem:b.oml", OntologyKind::Vocabulary, "http://b#", "b");
        b.add_member(Document::ROOT, MemberKind::Concept, Some(name.as_str())).unwrap();
        ws.load_document(b.finish().unwrap(), &cancel).unwrap();

        // The importing document reuses its own prefix for the import, so
        // "prefix:name" is spelled by both layers.
        let mut a = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", prefix.as_str());
        a.add_import(ImportKind::Extends, "<http://b#>", Some(prefix.as_str())).unwrap();
        let local = a.add_member(Document::ROOT, MemberKind::Concept, Some(name.as_str())).unwrap();
        let c = a.add_member(Document::ROOT, MemberKind::Concept, Some("Probe")).unwrap();
        let site = a.add_ref(c, RefSlot::SuperTerm, &format!("{prefix}:{name}")).unwrap();
        let doc = ws.load_document(a.finish().unwrap(), &cancel).unwrap();

        let target = ws.resolve_at(doc, site).unwrap();
        prop_assert_eq!(target.doc, doc);
        prop_assert_eq!(target.node, local);
    }
}
