//! Diagnostics — semantic error reporting.
//!
//! Every check attaches its finding to a node (and optionally one of the
//! node's properties) instead of throwing; an editor-facing collaborator
//! converts the attachment to a screen location through the document's
//! [`LineIndex`](crate::base::LineIndex) when source text was supplied.

use std::sync::Arc;

use crate::base::{DocId, TextRange};
use crate::model::NodeId;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message attached to a node.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The document containing this diagnostic.
    pub doc: DocId,
    /// The node the finding is attached to.
    pub node: NodeId,
    /// The node property the finding concerns, when one applies.
    pub property: Option<&'static str>,
    /// Source range of the node, when the parser recorded one.
    pub span: Option<TextRange>,
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(doc: DocId, node: NodeId, message: impl Into<Arc<str>>) -> Self {
        Self {
            doc,
            node,
            property: None,
            span: None,
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(doc: DocId, node: NodeId, message: impl Into<Arc<str>>) -> Self {
        Self {
            doc,
            node,
            property: None,
            span: None,
            severity: Severity::Warning,
            code: None,
            message: message.into(),
        }
    }

    /// Set the source span for this diagnostic.
    pub fn with_span(mut self, span: Option<TextRange>) -> Self {
        self.span = span;
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the finding to one property of the node.
    pub fn with_property(mut self, property: &'static str) -> Self {
        self.property = Some(property);
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for semantic errors.
pub mod codes {
    /// Unresolved reference (no candidate in any scope layer).
    pub const UNRESOLVED_REFERENCE: &str = "E0001";
    /// Import kind/target combination outside the compatibility matrix.
    pub const IMPORT_KIND_MISMATCH: &str = "E0002";
    /// Bracketed-IRI reference whose namespace no import covers.
    pub const MISSING_IMPORT: &str = "E0003";
    /// At-most-once facet property repeated on one axiom.
    pub const DUPLICATE_FACET: &str = "E0004";

    /// Declared import prefix never used by any reference.
    pub const UNUSED_IMPORT_PREFIX: &str = "W0001";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during a validation pass.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// A reference with no matching candidate in any scope layer.
    pub fn unresolved_reference(
        &mut self,
        doc: DocId,
        node: NodeId,
        property: &'static str,
        span: Option<TextRange>,
        text: &str,
    ) {
        self.add(
            Diagnostic::error(doc, node, format!("could not resolve reference '{}'", text))
                .with_property(property)
                .with_span(span)
                .with_code(codes::UNRESOLVED_REFERENCE),
        );
    }

    /// An import kind/target combination the matrix rejects.
    pub fn import_kind_mismatch(
        &mut self,
        doc: DocId,
        node: NodeId,
        span: Option<TextRange>,
        message: impl Into<Arc<str>>,
    ) {
        self.add(
            Diagnostic::error(doc, node, message)
                .with_span(span)
                .with_code(codes::IMPORT_KIND_MISMATCH),
        );
    }

    /// A bracketed cross-reference without a covering import.
    pub fn missing_import(
        &mut self,
        doc: DocId,
        node: NodeId,
        property: &'static str,
        span: Option<TextRange>,
        text: &str,
    ) {
        self.add(
            Diagnostic::error(
                doc,
                node,
                format!("could not find an ontology import for term '{}'", text),
            )
            .with_property(property)
            .with_span(span)
            .with_code(codes::MISSING_IMPORT),
        );
    }

    /// A facet property repeated on one scalar-equivalence axiom.
    pub fn duplicate_facet(
        &mut self,
        doc: DocId,
        node: NodeId,
        span: Option<TextRange>,
        property: &'static str,
    ) {
        self.add(
            Diagnostic::error(
                doc,
                node,
                format!("at most one of each facet is allowed (duplicate {})", property),
            )
            .with_property(property)
            .with_span(span)
            .with_code(codes::DUPLICATE_FACET),
        );
    }

    /// A declared import prefix no reference ever uses.
    pub fn unused_prefix(
        &mut self,
        doc: DocId,
        node: NodeId,
        span: Option<TextRange>,
        prefix: &str,
    ) {
        self.add(
            Diagnostic::warning(
                doc,
                node,
                format!("could not find a reference to prefix '{}'", prefix),
            )
            .with_property("prefix")
            .with_span(span)
            .with_code(codes::UNUSED_IMPORT_PREFIX),
        );
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics carrying a given code.
    pub fn diagnostics_with_code(&self, code: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.code.as_deref() == Some(code))
            .collect()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}
