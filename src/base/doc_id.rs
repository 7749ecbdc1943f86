//! Document identity.

use std::fmt;

/// Identity of a loaded ontology document.
///
/// Ids are assigned per URI by the document store and stay stable across
/// reloads, so index snapshots and diagnostics produced before a reload
/// still name the same document afterwards. Everything past the store
/// passes the id around instead of the URI; the reverse mapping lives in
/// the store.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DocId(pub u32);

impl DocId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocId({})", self.0)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

impl From<u32> for DocId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<DocId> for u32 {
    #[inline]
    fn from(id: DocId) -> Self {
        id.0
    }
}
