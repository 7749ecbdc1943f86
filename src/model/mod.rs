//! The document data model.
//!
//! [`kind`] is the closed kind vocabulary (ontology, import, and member
//! kinds plus the declared-type hierarchy); [`tree`] is the parsed
//! document tree an external parser hands to the engine.

pub mod kind;
pub mod tree;

pub use kind::{ElementKind, ExpectedType, FacetProperty, ImportKind, MemberKind, OntologyKind};
pub use tree::{
    Document, DocumentBuilder, FacetAssignment, Import, Member, ModelError, Node, NodeId,
    NodeKind, Ontology, Ref, RefId, RefSlot,
};
