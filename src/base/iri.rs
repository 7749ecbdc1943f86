//! IRI algebra: splitting and joining qualified identifiers.
//!
//! An IRI is `namespace + local name`, where the namespace ends in `#` or
//! `/`. The reference surface additionally uses a bracket-delimited form
//! (`<http://ns#Name>`). All functions here are pure; no escaping or case
//! normalization is performed.

use smol_str::{SmolStr, format_smolstr};

/// Split an IRI into `(namespace, local_name)`.
///
/// The split point is the last `#`, or failing that the last `/`; the
/// namespace keeps the separator. Text without either separator splits
/// into an empty namespace and the whole text as local name.
pub fn split_iri(iri: &str) -> (&str, &str) {
    match iri.rfind('#').or_else(|| iri.rfind('/')) {
        Some(i) => iri.split_at(i + 1),
        None => ("", iri),
    }
}

/// Join a namespace and a local name back into an IRI.
pub fn join_iri(namespace: &str, local: &str) -> SmolStr {
    format_smolstr!("{namespace}{local}")
}

/// Wrap an IRI in the bracket-delimited reference form.
pub fn bracket(iri: &str) -> SmolStr {
    format_smolstr!("<{iri}>")
}

/// Whether reference text uses the bracket-delimited form.
///
/// Only the opening bracket is required; a half-typed reference may not
/// have the closing one yet.
pub fn is_bracketed(text: &str) -> bool {
    text.starts_with('<')
}

/// Strip the bracket delimiters from reference text.
///
/// The trailing `>` is stripped only when present, so half-typed input
/// degrades to its raw IRI rather than losing a character.
pub fn strip_brackets(text: &str) -> &str {
    let text = text.strip_prefix('<').unwrap_or(text);
    text.strip_suffix('>').unwrap_or(text)
}

/// Split bracketed reference text into `(namespace, local_name)`.
///
/// Returns None when the text contains no `#` or `/` separator; such a
/// reference is not covered by any namespace.
pub fn split_bracketed(text: &str) -> Option<(&str, &str)> {
    let inner = strip_brackets(text);
    match inner.rfind('#').or_else(|| inner.rfind('/')) {
        Some(i) => Some(inner.split_at(i + 1)),
        None => None,
    }
}

/// Whether a string is a well-formed namespace (non-empty, ends in `#` or `/`).
pub fn is_valid_namespace(namespace: &str) -> bool {
    namespace.ends_with('#') || namespace.ends_with('/')
}
