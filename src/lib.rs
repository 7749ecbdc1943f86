//! # oml-base
//!
//! Core library for OML ontology documents: name resolution, scoping,
//! and import validation.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! hir     → Exports, symbol index, scopes, validation, workspace
//!   ↓
//! model   → Document tree and the closed kind vocabulary
//!   ↓
//! base    → Primitives (DocId, spans, IRI algebra)
//! ```
//!
//! An external parser builds a [`model::Document`] through
//! [`model::DocumentBuilder`] and hands it to a [`hir::Workspace`];
//! editor-facing collaborators consume [`hir::Scope`] candidate sets and
//! [`hir::Diagnostic`]s. The engine itself never parses text and never
//! mutates a document after construction.

/// Foundation types: DocId, spans, IRI algebra
pub mod base;

/// The parsed document tree and kind vocabulary
pub mod model;

/// Semantic analysis: exports, index, scopes, validation
pub mod hir;

// Re-export the public surface
pub use base::{DocId, LineCol, LineIndex, TextRange, TextSize};
pub use hir::{
    Diagnostic, ExportEntry, LoadError, LocalScopes, Scope, ScopeProvider, Severity, SymbolIndex,
    Workspace,
};
pub use model::{
    Document, DocumentBuilder, ExpectedType, ImportKind, MemberKind, ModelError, NodeId,
    OntologyKind, RefId, RefSlot,
};
