//! Semantic analysis over parsed documents.
//!
//! The per-document passes ([`exports`]) feed the shared [`SymbolIndex`];
//! [`scope`] composes candidate sets for reference sites; [`validate`]
//! turns rule violations into [`Diagnostic`]s; [`workspace`] ties the
//! pieces together behind one handle.

pub mod diagnostics;
pub mod exports;
pub mod index;
pub mod scope;
pub mod store;
pub mod validate;
pub mod workspace;

pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use exports::{ExportEntry, LocalScopes, compute_exports, compute_local_scopes};
pub use index::{DocumentExports, SymbolIndex};
pub use scope::{Scope, ScopeProvider};
pub use store::{DocumentState, DocumentStore};
pub use validate::check_document;
pub use workspace::{LoadError, Workspace};
