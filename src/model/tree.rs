//! The parsed document tree.
//!
//! An external parser hands the engine one [`Document`] per source file,
//! built through [`DocumentBuilder`]. Nodes live in a per-document arena
//! and point at their parent, so walking a containment chain is an index
//! lookup rather than a shared back-pointer. Reference occurrences are
//! stored on their owning node and addressed by [`RefId`].

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::{LineIndex, TextRange, iri};
use super::kind::{ExpectedType, FacetProperty, ImportKind, MemberKind, OntologyKind};

// ============================================================================
// IDS
// ============================================================================

/// Index of a node within its document's arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A reference site: a node plus the position of the reference on it.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct RefId {
    /// The node owning the reference
    pub node: NodeId,
    /// Position within the node's reference list
    pub index: u32,
}

impl RefId {
    #[inline]
    pub const fn new(node: NodeId, index: u32) -> Self {
        Self { node, index }
    }
}

impl fmt::Debug for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefId({}:{})", self.node.0, self.index)
    }
}

// ============================================================================
// REFERENCES
// ============================================================================

/// Reference slots the engine knows how to type.
///
/// Each slot corresponds to one reference-bearing property of the surface
/// grammar. [`RefSlot::Unknown`] covers properties the engine has no
/// typing rule for; scopes for such sites are empty.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RefSlot {
    /// An import's target ontology
    ImportTarget,
    /// The specialized term of a specialization axiom
    SuperTerm,
    /// The equivalent scalar of a scalar-equivalence axiom
    EquivalentScalar,
    /// A relation entity's source entity
    RelationSource,
    /// A relation entity's target entity
    RelationTarget,
    /// An instance's asserted type
    InstanceType,
    /// A named instance in a relation-instance assertion
    InstanceRef,
    /// The property of a property-value assertion
    PropertyRef,
    /// A reference property with no typing rule
    Unknown,
}

impl RefSlot {
    /// The slot's property name, used when attaching diagnostics.
    pub fn property_name(self) -> &'static str {
        match self {
            RefSlot::ImportTarget => "imported",
            RefSlot::SuperTerm => "superTerm",
            RefSlot::EquivalentScalar => "superScalar",
            RefSlot::RelationSource => "source",
            RefSlot::RelationTarget => "target",
            RefSlot::InstanceType => "type",
            RefSlot::InstanceRef => "instance",
            RefSlot::PropertyRef => "property",
            RefSlot::Unknown => "ref",
        }
    }

    /// The declared type expected at this slot before any context-sensitive
    /// override (super-term inference, the import matrix).
    pub fn default_expected(self) -> Option<ExpectedType> {
        match self {
            RefSlot::ImportTarget => Some(ExpectedType::Ontology),
            RefSlot::SuperTerm => Some(ExpectedType::Term),
            RefSlot::EquivalentScalar => Some(ExpectedType::exactly(MemberKind::Scalar)),
            RefSlot::RelationSource | RefSlot::RelationTarget => Some(ExpectedType::Entity),
            RefSlot::InstanceType => Some(ExpectedType::Entity),
            RefSlot::InstanceRef => Some(ExpectedType::Instance),
            RefSlot::PropertyRef => Some(ExpectedType::Property),
            RefSlot::Unknown => None,
        }
    }
}

/// A reference occurrence: raw text at a typed slot.
///
/// The text is one of: a bare name (`Foo`), a prefixed name (`pfx:Foo`),
/// or a bracketed IRI (`<http://ns#Foo>`). References stay unresolved in
/// the tree; resolution is a scope query, never stored state.
#[derive(Clone, Debug)]
pub struct Ref {
    pub slot: RefSlot,
    pub text: SmolStr,
}

// ============================================================================
// NODE PAYLOADS
// ============================================================================

/// Root payload of a document.
#[derive(Clone, Debug)]
pub struct Ontology {
    pub kind: OntologyKind,
    /// Must end in `#` or `/` when non-empty; empty while half-typed
    pub namespace: SmolStr,
    /// The document's own abbreviation prefix; may be empty
    pub prefix: SmolStr,
}

/// An import declaration owned by the root ontology.
///
/// The target reference (bracketed-namespace form) lives in the import
/// node's reference list at [`RefSlot::ImportTarget`].
#[derive(Clone, Debug)]
pub struct Import {
    pub kind: ImportKind,
    pub prefix: Option<SmolStr>,
}

/// A named declaration.
#[derive(Clone, Debug)]
pub struct Member {
    pub kind: MemberKind,
    /// Absent while half-typed; unnamed members are never exported
    pub name: Option<SmolStr>,
}

/// One facet assignment of a scalar-equivalence axiom.
#[derive(Clone, Debug)]
pub struct FacetAssignment {
    pub property: FacetProperty,
    pub value: SmolStr,
}

impl FacetAssignment {
    pub fn new(property: FacetProperty, value: impl Into<SmolStr>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }
}

/// What a node is.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// The document root; its payload lives on [`Document`]
    Ontology,
    Import(Import),
    Member(Member),
    /// Specialization axiom; the super term is the node's SuperTerm ref
    Specialization,
    /// Scalar-equivalence axiom with its facet assignments
    ScalarEquivalence { facets: Vec<FacetAssignment> },
    /// Property-value assertion; the property is the node's PropertyRef ref
    PropertyValue,
}

impl NodeKind {
    fn describe(&self) -> &'static str {
        match self {
            NodeKind::Ontology => "ontology",
            NodeKind::Import(_) => "import",
            NodeKind::Member(_) => "member",
            NodeKind::Specialization => "specialization axiom",
            NodeKind::ScalarEquivalence { .. } => "scalar equivalence axiom",
            NodeKind::PropertyValue => "property value assertion",
        }
    }
}

/// One node of the document tree.
#[derive(Clone, Debug)]
pub struct Node {
    /// None only for the root
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    /// Reference occurrences owned by this node, in source order
    pub refs: Vec<Ref>,
    pub span: Option<TextRange>,
}

// ============================================================================
// DOCUMENT
// ============================================================================

/// Construction-time validation errors.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("namespace '{0}' must end in '#' or '/'")]
    InvalidNamespace(SmolStr),
    #[error("unknown parent node {0:?}")]
    UnknownNode(NodeId),
    #[error("a {child} cannot be owned by a {parent}")]
    InvalidOwner {
        child: &'static str,
        parent: &'static str,
    },
}

/// A parsed ontology document.
///
/// Immutable once built; all engine passes read it, none mutate it.
#[derive(Debug)]
pub struct Document {
    uri: SmolStr,
    ontology: Ontology,
    nodes: Vec<Node>,
    /// Import nodes in declaration order
    import_nodes: Vec<NodeId>,
    /// Source text, when the parser attached it
    source: Option<Arc<str>>,
}

impl Document {
    /// The root ontology node, always first in the arena.
    pub const ROOT: NodeId = NodeId::new(0);

    /// Start building a document.
    pub fn builder(
        uri: impl Into<SmolStr>,
        kind: OntologyKind,
        namespace: impl Into<SmolStr>,
        prefix: impl Into<SmolStr>,
    ) -> DocumentBuilder {
        DocumentBuilder {
            uri: uri.into(),
            ontology: Ontology {
                kind,
                namespace: namespace.into(),
                prefix: prefix.into(),
            },
            nodes: vec![Node {
                parent: None,
                kind: NodeKind::Ontology,
                refs: Vec::new(),
                span: None,
            }],
            import_nodes: Vec::new(),
            source: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn namespace(&self) -> &str {
        &self.ontology.namespace
    }

    pub fn prefix(&self) -> &str {
        &self.ontology.prefix
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index() as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in arena order (root first).
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i as u32), node))
    }

    /// The declared imports, in source order.
    pub fn imports(&self) -> impl Iterator<Item = (NodeId, &Import)> {
        self.import_nodes.iter().filter_map(|&id| {
            match &self.node(id)?.kind {
                NodeKind::Import(import) => Some((id, import)),
                _ => None,
            }
        })
    }

    /// The member payload of a node, if it is one.
    pub fn member(&self, id: NodeId) -> Option<&Member> {
        match &self.node(id)?.kind {
            NodeKind::Member(member) => Some(member),
            _ => None,
        }
    }

    /// The import payload of a node, if it is one.
    pub fn import(&self, id: NodeId) -> Option<&Import> {
        match &self.node(id)?.kind {
            NodeKind::Import(import) => Some(import),
            _ => None,
        }
    }

    /// An import node's raw target text (bracketed-namespace form).
    pub fn import_target_text(&self, id: NodeId) -> Option<&str> {
        self.node(id)?
            .refs
            .iter()
            .find(|r| r.slot == RefSlot::ImportTarget)
            .map(|r| r.text.as_str())
    }

    /// A single reference occurrence.
    pub fn reference(&self, id: RefId) -> Option<&Ref> {
        self.node(id.node)?.refs.get(id.index as usize)
    }

    /// Every reference occurrence in the document, in arena order.
    pub fn refs(&self) -> impl Iterator<Item = (RefId, &Ref)> {
        self.nodes().flat_map(|(node_id, node)| {
            node.refs
                .iter()
                .enumerate()
                .map(move |(i, r)| (RefId::new(node_id, i as u32), r))
        })
    }

    /// Containment chain from `id` up to the root, starting with `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.node(id).map(|_| id),
        }
    }

    /// The nearest member at or above `id`.
    pub fn enclosing_member(&self, id: NodeId) -> Option<(NodeId, &Member)> {
        self.ancestors(id)
            .find_map(|anc| self.member(anc).map(|m| (anc, m)))
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Line index over the attached source text.
    pub fn line_index(&self) -> Option<LineIndex> {
        self.source.as_deref().map(LineIndex::new)
    }
}

/// Iterator over a node's containment chain.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.doc.node(id).and_then(|n| n.parent);
        Some(id)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Incrementally builds a [`Document`]; the seam an external parser drives.
#[derive(Debug)]
pub struct DocumentBuilder {
    uri: SmolStr,
    ontology: Ontology,
    nodes: Vec<Node>,
    import_nodes: Vec<NodeId>,
    source: Option<Arc<str>>,
}

impl DocumentBuilder {
    /// Attach the source text the tree was parsed from.
    pub fn with_source(mut self, text: impl Into<Arc<str>>) -> Self {
        self.source = Some(text.into());
        self
    }

    /// Add a member under `parent` (the root or another member).
    pub fn add_member(
        &mut self,
        parent: NodeId,
        kind: MemberKind,
        name: Option<&str>,
    ) -> Result<NodeId, ModelError> {
        self.check_owner(parent, "member", |k| {
            matches!(k, NodeKind::Ontology | NodeKind::Member(_))
        })?;
        Ok(self.push(
            parent,
            NodeKind::Member(Member {
                kind,
                name: name.map(SmolStr::from),
            }),
            Vec::new(),
        ))
    }

    /// Add an import declaration; `target` is the bracketed-namespace text.
    pub fn add_import(
        &mut self,
        kind: ImportKind,
        target: &str,
        prefix: Option<&str>,
    ) -> Result<NodeId, ModelError> {
        let id = self.push(
            Document::ROOT,
            NodeKind::Import(Import {
                kind,
                prefix: prefix.map(SmolStr::from),
            }),
            vec![Ref {
                slot: RefSlot::ImportTarget,
                text: SmolStr::from(target),
            }],
        );
        self.import_nodes.push(id);
        Ok(id)
    }

    /// Add a specialization axiom under a member.
    pub fn add_specialization(
        &mut self,
        parent: NodeId,
        super_term: &str,
    ) -> Result<NodeId, ModelError> {
        self.check_owner(parent, "specialization axiom", |k| {
            matches!(k, NodeKind::Member(_))
        })?;
        Ok(self.push(
            parent,
            NodeKind::Specialization,
            vec![Ref {
                slot: RefSlot::SuperTerm,
                text: SmolStr::from(super_term),
            }],
        ))
    }

    /// Add a scalar-equivalence axiom under a member.
    pub fn add_scalar_equivalence(
        &mut self,
        parent: NodeId,
        super_scalar: &str,
        facets: Vec<FacetAssignment>,
    ) -> Result<NodeId, ModelError> {
        self.check_owner(parent, "scalar equivalence axiom", |k| {
            matches!(k, NodeKind::Member(_))
        })?;
        Ok(self.push(
            parent,
            NodeKind::ScalarEquivalence { facets },
            vec![Ref {
                slot: RefSlot::EquivalentScalar,
                text: SmolStr::from(super_scalar),
            }],
        ))
    }

    /// Add a property-value assertion under a member.
    pub fn add_property_value(
        &mut self,
        parent: NodeId,
        property: &str,
    ) -> Result<NodeId, ModelError> {
        self.check_owner(parent, "property value assertion", |k| {
            matches!(k, NodeKind::Member(_))
        })?;
        Ok(self.push(
            parent,
            NodeKind::PropertyValue,
            vec![Ref {
                slot: RefSlot::PropertyRef,
                text: SmolStr::from(property),
            }],
        ))
    }

    /// Add a reference occurrence to an existing node.
    pub fn add_ref(
        &mut self,
        node: NodeId,
        slot: RefSlot,
        text: &str,
    ) -> Result<RefId, ModelError> {
        let target = self
            .nodes
            .get_mut(node.index() as usize)
            .ok_or(ModelError::UnknownNode(node))?;
        target.refs.push(Ref {
            slot,
            text: SmolStr::from(text),
        });
        Ok(RefId::new(node, (target.refs.len() - 1) as u32))
    }

    /// Record a node's source span. No effect if the node is unknown.
    pub fn set_span(&mut self, node: NodeId, span: TextRange) {
        if let Some(n) = self.nodes.get_mut(node.index() as usize) {
            n.span = Some(span);
        }
    }

    /// Validate and produce the document.
    pub fn finish(self) -> Result<Document, ModelError> {
        let namespace = &self.ontology.namespace;
        if !namespace.is_empty() && !iri::is_valid_namespace(namespace) {
            return Err(ModelError::InvalidNamespace(namespace.clone()));
        }
        Ok(Document {
            uri: self.uri,
            ontology: self.ontology,
            nodes: self.nodes,
            import_nodes: self.import_nodes,
            source: self.source,
        })
    }

    fn check_owner(
        &self,
        parent: NodeId,
        child: &'static str,
        allowed: impl Fn(&NodeKind) -> bool,
    ) -> Result<(), ModelError> {
        let node = self
            .nodes
            .get(parent.index() as usize)
            .ok_or(ModelError::UnknownNode(parent))?;
        if allowed(&node.kind) {
            Ok(())
        } else {
            Err(ModelError::InvalidOwner {
                child,
                parent: node.kind.describe(),
            })
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind, refs: Vec<Ref>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: Some(parent),
            kind,
            refs,
            span: None,
        });
        id
    }
}
