//! Document lifecycle: reloads, retraction, cancellation, and the
//! atomicity of export publication.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use oml::hir::codes;
use oml::{
    Document, ExpectedType, ImportKind, LoadError, MemberKind, OntologyKind, RefId, Workspace,
};

fn vocab(uri: &str, namespace: &str, prefix: &str, members: &[&str]) -> Document {
    let mut b = Document::builder(uri, OntologyKind::Vocabulary, namespace, prefix);
    for name in members {
        b.add_member(Document::ROOT, MemberKind::Concept, Some(name)).unwrap();
    }
    b.finish().unwrap()
}

#[test]
fn reload_fully_replaces_export_contribution() {
    let ws = Workspace::new();
    let cancel = CancellationToken::new();

    ws.load_document(vocab("mem:b.oml", "http://b#", "b", &["Old"]), &cancel).unwrap();

    // A specializes b:Old; valid against the first version of B.
    let mut a = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
    a.add_import(ImportKind::Extends, "<http://b#>", Some("b")).unwrap();
    let c = a.add_member(Document::ROOT, MemberKind::Concept, Some("C")).unwrap();
    a.add_specialization(c, "b:Old").unwrap();
    let doc_a = ws.load_document(a.finish().unwrap(), &cancel).unwrap();
    assert!(ws.check(doc_a, &cancel).unwrap().is_empty());

    // B is reparsed without Old; A's reference must now dangle, and no
    // stale entry may keep it alive.
    ws.load_document(vocab("mem:b.oml", "http://b#", "b", &["New"]), &cancel).unwrap();

    let diags = ws.check(doc_a, &cancel).unwrap();
    assert_eq!(
        diags
            .iter()
            .filter(|d| d.code.as_deref() == Some(codes::UNRESOLVED_REFERENCE))
            .count(),
        1
    );

    let spellings: Vec<_> = ws
        .all_elements(ExpectedType::Member, None)
        .into_iter()
        .map(|e| e.spelling)
        .collect();
    assert!(spellings.contains(&"<http://b#New>".into()));
    assert!(!spellings.iter().any(|s| s.contains("Old")), "stale export survived reload");
}

#[test]
fn cancelled_reload_keeps_previous_snapshot() {
    let ws = Workspace::new();
    let cancel = CancellationToken::new();
    let id = ws
        .load_document(vocab("mem:a.oml", "http://a#", "a", &["Keep"]), &cancel)
        .unwrap();

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    let err = ws
        .load_document(vocab("mem:a.oml", "http://a#", "a", &["Gone"]), &cancelled)
        .unwrap_err();
    assert!(matches!(err, LoadError::Cancelled));

    let snapshot = ws.index().snapshot(id).expect("previous snapshot must survive");
    assert_eq!(snapshot.entries.len(), 2); // ontology + Keep
    assert!(snapshot.entries.iter().any(|e| e.spelling == "<http://a#Keep>"));
}

#[test]
fn cancelled_check_reports_nothing() {
    let ws = Workspace::new();
    let cancel = CancellationToken::new();
    let mut a = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
    let c = a.add_member(Document::ROOT, MemberKind::Concept, Some("C")).unwrap();
    a.add_specialization(c, "Missing").unwrap();
    let doc = ws.load_document(a.finish().unwrap(), &cancel).unwrap();

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    assert!(ws.check(doc, &cancelled).is_none());
}

#[test]
fn namespaces_are_globally_unique() {
    let ws = Workspace::new();
    let cancel = CancellationToken::new();
    ws.load_document(vocab("mem:a.oml", "http://shared#", "a", &[]), &cancel).unwrap();

    let err = ws
        .load_document(vocab("mem:other.oml", "http://shared#", "o", &[]), &cancel)
        .unwrap_err();
    match err {
        LoadError::DuplicateNamespace { namespace, existing_uri } => {
            assert_eq!(namespace, "http://shared#");
            assert_eq!(existing_uri, "mem:a.oml");
        }
        other => panic!("expected DuplicateNamespace, got {other:?}"),
    }

    // The same document may redeclare its own namespace on reload.
    ws.load_document(vocab("mem:a.oml", "http://shared#", "a", &["X"]), &cancel).unwrap();
}

#[test]
fn removal_retracts_exports_and_breaks_resolution() {
    let ws = Workspace::new();
    let cancel = CancellationToken::new();
    ws.load_document(vocab("mem:b.oml", "http://b#", "b", &["X"]), &cancel).unwrap();

    let mut a = Document::builder("mem:a.oml", OntologyKind::Vocabulary, "http://a#", "a");
    a.add_import(ImportKind::Extends, "<http://b#>", Some("b")).unwrap();
    let c = a.add_member(Document::ROOT, MemberKind::Concept, Some("C")).unwrap();
    let site = a.add_specialization(c, "b:X").unwrap();
    let doc_a = ws.load_document(a.finish().unwrap(), &cancel).unwrap();
    assert!(ws.resolve_at(doc_a, RefId::new(site, 0)).is_some());

    assert!(ws.remove_document("mem:b.oml"));
    assert!(ws.resolve_at(doc_a, RefId::new(site, 0)).is_none());
    assert!(ws.index().ontology_by_namespace("http://b#").is_none());
}

#[test]
fn concurrent_readers_see_whole_snapshots() {
    let ws = Arc::new(Workspace::new());
    let cancel = CancellationToken::new();
    ws.load_document(vocab("mem:a.oml", "http://a#", "a", &["One", "Two"]), &cancel)
        .unwrap();

    // Writer republishes the same two members repeatedly while readers
    // query; every read must observe both members or, transiently during
    // a swap, a complete older snapshot — never a torn table.
    let writer = {
        let ws = Arc::clone(&ws);
        std::thread::spawn(move || {
            let cancel = CancellationToken::new();
            for _ in 0..200 {
                ws.load_document(vocab("mem:a.oml", "http://a#", "a", &["One", "Two"]), &cancel)
                    .unwrap();
            }
        })
    };

    let reader = {
        let ws = Arc::clone(&ws);
        std::thread::spawn(move || {
            for _ in 0..200 {
                let members = ws.all_elements(ExpectedType::Member, None);
                assert_eq!(members.len(), 2, "torn read of an export snapshot");
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
}
