//! Foundation types for the OML engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`DocId`] - Interned document identifiers
//! - [`TextRange`], [`TextSize`] - Source positions
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`iri`] - IRI splitting, joining, bracketed forms
//!
//! This module has NO dependencies on other oml modules.

pub mod iri;

mod doc_id;
mod span;

pub use doc_id::DocId;
pub use span::{TextRange, TextSize, LineCol, LineIndex};

// Re-export text-size types for convenience
pub use text_size;
