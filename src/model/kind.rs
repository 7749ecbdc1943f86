//! Closed kind vocabulary for documents, imports, and members.
//!
//! Type tests over the surface language are expressed here as tagged
//! variants: every node carries a concrete kind, and scope filters
//! match against an [`ExpectedType`] that widens concrete kinds into the
//! abstract supertypes (Entity, Relation, Property, VocabularyBox, ...).

use std::fmt;

// ============================================================================
// ONTOLOGY & IMPORT KINDS
// ============================================================================

/// The four ontology document kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OntologyKind {
    Vocabulary,
    VocabularyBundle,
    Description,
    DescriptionBundle,
}

/// The three import kinds an ontology may declare.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ImportKind {
    Extends,
    Uses,
    Includes,
}

impl OntologyKind {
    /// The legal target for an import of `kind` declared by this ontology
    /// kind, or None when the import kind itself is illegal here.
    ///
    /// This table is the single source for both the scope provider's
    /// expected-type inference and the import validator:
    ///
    /// | importing kind     | extends            | uses                 | includes     |
    /// |--------------------|--------------------|----------------------|--------------|
    /// | Vocabulary         | Vocabulary         | Description          | -            |
    /// | VocabularyBundle   | VocabularyBundle   | -                    | Vocabulary   |
    /// | Description        | Description        | Vocabulary           | -            |
    /// | DescriptionBundle  | DescriptionBundle  | VocabularyBox        | Description  |
    pub fn import_target(self, kind: ImportKind) -> Option<ExpectedType> {
        use ImportKind::*;
        use OntologyKind::*;
        match (self, kind) {
            (Vocabulary, Extends) => Some(ExpectedType::exactly(Vocabulary)),
            (Vocabulary, Uses) => Some(ExpectedType::exactly(Description)),
            (VocabularyBundle, Extends) => Some(ExpectedType::exactly(VocabularyBundle)),
            (VocabularyBundle, Includes) => Some(ExpectedType::exactly(Vocabulary)),
            (Description, Extends) => Some(ExpectedType::exactly(Description)),
            (Description, Uses) => Some(ExpectedType::exactly(Vocabulary)),
            (DescriptionBundle, Extends) => Some(ExpectedType::exactly(DescriptionBundle)),
            (DescriptionBundle, Uses) => Some(ExpectedType::VocabularyBox),
            (DescriptionBundle, Includes) => Some(ExpectedType::exactly(Description)),
            _ => None,
        }
    }

    /// Human summary of this kind's legal imports, used in diagnostics.
    pub fn legal_imports(self) -> &'static str {
        match self {
            OntologyKind::Vocabulary => "a vocabulary can extend vocabularies and use descriptions",
            OntologyKind::VocabularyBundle => {
                "a vocabulary bundle can extend vocabulary bundles and include vocabularies"
            }
            OntologyKind::Description => "a description can extend descriptions and use vocabularies",
            OntologyKind::DescriptionBundle => {
                "a description bundle can extend description bundles, include descriptions, and use vocabularies or vocabulary bundles"
            }
        }
    }
}

impl fmt::Display for OntologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OntologyKind::Vocabulary => "vocabulary",
            OntologyKind::VocabularyBundle => "vocabulary bundle",
            OntologyKind::Description => "description",
            OntologyKind::DescriptionBundle => "description bundle",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportKind::Extends => "extends",
            ImportKind::Uses => "uses",
            ImportKind::Includes => "includes",
        };
        f.write_str(name)
    }
}

// ============================================================================
// MEMBER KINDS
// ============================================================================

/// The concrete declared type of a named member.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberKind {
    Aspect,
    Concept,
    RelationEntity,
    Structure,
    Scalar,
    AnnotationProperty,
    ScalarProperty,
    StructuredProperty,
    ForwardRelation,
    ReverseRelation,
    Rule,
    ConceptInstance,
    RelationInstance,
}

impl MemberKind {
    /// Terms are the vocabulary members: everything except rules and
    /// instances.
    pub fn is_term(self) -> bool {
        !matches!(
            self,
            MemberKind::Rule | MemberKind::ConceptInstance | MemberKind::RelationInstance
        )
    }

    pub fn is_entity(self) -> bool {
        matches!(
            self,
            MemberKind::Aspect | MemberKind::Concept | MemberKind::RelationEntity
        )
    }

    pub fn is_relation(self) -> bool {
        matches!(self, MemberKind::ForwardRelation | MemberKind::ReverseRelation)
    }

    pub fn is_property(self) -> bool {
        matches!(
            self,
            MemberKind::AnnotationProperty
                | MemberKind::ScalarProperty
                | MemberKind::StructuredProperty
        )
    }

    pub fn is_instance(self) -> bool {
        matches!(self, MemberKind::ConceptInstance | MemberKind::RelationInstance)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberKind::Aspect => "aspect",
            MemberKind::Concept => "concept",
            MemberKind::RelationEntity => "relation entity",
            MemberKind::Structure => "structure",
            MemberKind::Scalar => "scalar",
            MemberKind::AnnotationProperty => "annotation property",
            MemberKind::ScalarProperty => "scalar property",
            MemberKind::StructuredProperty => "structured property",
            MemberKind::ForwardRelation => "forward relation",
            MemberKind::ReverseRelation => "reverse relation",
            MemberKind::Rule => "rule",
            MemberKind::ConceptInstance => "concept instance",
            MemberKind::RelationInstance => "relation instance",
        };
        f.write_str(name)
    }
}

// ============================================================================
// DECLARED TYPES & EXPECTED-TYPE FILTERS
// ============================================================================

/// The concrete declared type carried by a symbol-table entry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ElementKind {
    Ontology(OntologyKind),
    Member(MemberKind),
}

impl From<OntologyKind> for ElementKind {
    fn from(kind: OntologyKind) -> Self {
        ElementKind::Ontology(kind)
    }
}

impl From<MemberKind> for ElementKind {
    fn from(kind: MemberKind) -> Self {
        ElementKind::Member(kind)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Ontology(k) => k.fmt(f),
            ElementKind::Member(k) => k.fmt(f),
        }
    }
}

/// A declared-type filter for scope queries.
///
/// Widens the concrete [`ElementKind`] tags into the abstract supertypes
/// of the declared-type hierarchy.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExpectedType {
    /// Any ontology document.
    Ontology,
    /// Vocabulary or vocabulary bundle.
    VocabularyBox,
    /// Description or description bundle.
    DescriptionBox,
    /// Any named member.
    Member,
    /// Any term (non-rule, non-instance member).
    Term,
    /// Aspect, concept, or relation entity.
    Entity,
    /// Forward or reverse relation.
    Relation,
    /// Annotation, scalar, or structured property.
    Property,
    /// Concept or relation instance.
    Instance,
    /// Exactly one concrete kind.
    Exactly(ElementKind),
}

impl ExpectedType {
    pub fn exactly(kind: impl Into<ElementKind>) -> Self {
        ExpectedType::Exactly(kind.into())
    }

    /// Whether a concrete declared type satisfies this filter.
    pub fn admits(self, kind: ElementKind) -> bool {
        match self {
            ExpectedType::Ontology => matches!(kind, ElementKind::Ontology(_)),
            ExpectedType::VocabularyBox => matches!(
                kind,
                ElementKind::Ontology(OntologyKind::Vocabulary | OntologyKind::VocabularyBundle)
            ),
            ExpectedType::DescriptionBox => matches!(
                kind,
                ElementKind::Ontology(OntologyKind::Description | OntologyKind::DescriptionBundle)
            ),
            ExpectedType::Member => matches!(kind, ElementKind::Member(_)),
            ExpectedType::Term => matches!(kind, ElementKind::Member(m) if m.is_term()),
            ExpectedType::Entity => matches!(kind, ElementKind::Member(m) if m.is_entity()),
            ExpectedType::Relation => matches!(kind, ElementKind::Member(m) if m.is_relation()),
            ExpectedType::Property => matches!(kind, ElementKind::Member(m) if m.is_property()),
            ExpectedType::Instance => matches!(kind, ElementKind::Member(m) if m.is_instance()),
            ExpectedType::Exactly(k) => kind == k,
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedType::Ontology => f.write_str("ontology"),
            ExpectedType::VocabularyBox => f.write_str("vocabulary or vocabulary bundle"),
            ExpectedType::DescriptionBox => f.write_str("description or description bundle"),
            ExpectedType::Member => f.write_str("member"),
            ExpectedType::Term => f.write_str("term"),
            ExpectedType::Entity => f.write_str("entity"),
            ExpectedType::Relation => f.write_str("relation"),
            ExpectedType::Property => f.write_str("property"),
            ExpectedType::Instance => f.write_str("instance"),
            ExpectedType::Exactly(k) => k.fmt(f),
        }
    }
}

// ============================================================================
// FACET PROPERTIES
// ============================================================================

/// Facet properties of a scalar-equivalence axiom.
///
/// Each may appear at most once per axiom; the grammar cannot enforce
/// that, so the validator does.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FacetProperty {
    Length,
    MinLength,
    MaxLength,
    Pattern,
    Language,
    MinInclusive,
    MinExclusive,
    MaxInclusive,
    MaxExclusive,
}

impl FacetProperty {
    /// The property name as spelled in the surface language.
    pub fn name(self) -> &'static str {
        match self {
            FacetProperty::Length => "length",
            FacetProperty::MinLength => "minLength",
            FacetProperty::MaxLength => "maxLength",
            FacetProperty::Pattern => "pattern",
            FacetProperty::Language => "language",
            FacetProperty::MinInclusive => "minInclusive",
            FacetProperty::MinExclusive => "minExclusive",
            FacetProperty::MaxInclusive => "maxInclusive",
            FacetProperty::MaxExclusive => "maxExclusive",
        }
    }
}

impl fmt::Display for FacetProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
