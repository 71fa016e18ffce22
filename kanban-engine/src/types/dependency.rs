//! Dependency types: typed edges between cards.
//!
//! Hosts hand us dependencies in two shapes: a bare prerequisite id, or a
//! record carrying a relation type and strength. Both are normalized here,
//! at deserialization, into [`Dependency`]; nothing past this module looks
//! at the original shape.

use super::ids::{CardId, RelationshipId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relationship type classification.
///
/// Declaration order is significant: it breaks ties when analytics pick the
/// most common relation type.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Blocks,
    #[default]
    #[serde(alias = "depends-on", alias = "dependsOn")]
    DependsOn,
    #[serde(alias = "relates-to", alias = "relatesTo", alias = "related")]
    RelatesTo,
    Duplicates,
    #[serde(alias = "parent-of", alias = "parent")]
    ParentOf,
    #[serde(alias = "child-of", alias = "child")]
    ChildOf,
    #[serde(alias = "similar-to", alias = "similarTo", alias = "similarity")]
    SimilarTo,
}

impl RelationType {
    /// Every relation type, in declaration order
    pub const ALL: [RelationType; 7] = [
        RelationType::Blocks,
        RelationType::DependsOn,
        RelationType::RelatesTo,
        RelationType::Duplicates,
        RelationType::ParentOf,
        RelationType::ChildOf,
        RelationType::SimilarTo,
    ];

    /// Whether edges of this type constrain ordering and so must stay acyclic.
    pub fn is_ordering(self) -> bool {
        matches!(self, RelationType::Blocks | RelationType::DependsOn)
    }

    /// Whether this type reads the same in both directions
    pub fn is_symmetric(self) -> bool {
        matches!(self, RelationType::RelatesTo | RelationType::SimilarTo)
    }

    /// Canonical string form
    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Blocks => "blocks",
            RelationType::DependsOn => "depends_on",
            RelationType::RelatesTo => "relates_to",
            RelationType::Duplicates => "duplicates",
            RelationType::ParentOf => "parent_of",
            RelationType::ChildOf => "child_of",
            RelationType::SimilarTo => "similar_to",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a card's dependency list. The owning card is the dependent
/// side; `on` names the prerequisite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DependencyRef")]
pub struct Dependency {
    pub on: CardId,
    #[serde(rename = "type")]
    pub kind: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

impl Dependency {
    /// Plain "depends on" entry
    pub fn new(on: impl Into<CardId>) -> Self {
        Self {
            on: on.into(),
            kind: RelationType::DependsOn,
            strength: None,
        }
    }

    /// Set the relation type
    pub fn with_kind(mut self, kind: RelationType) -> Self {
        self.kind = kind;
        self
    }

    /// Set the strength, rejecting values outside `0..=1`
    pub fn with_strength(mut self, strength: f64) -> Result<Self, String> {
        self.strength = Some(check_strength(strength)?);
        Ok(self)
    }
}

pub(crate) fn check_strength(strength: f64) -> Result<f64, String> {
    if (0.0..=1.0).contains(&strength) {
        Ok(strength)
    } else {
        Err(format!("strength must be within 0..=1, got {strength}"))
    }
}

/// Wire shapes accepted for a dependency entry
#[derive(Deserialize)]
#[serde(untagged)]
enum DependencyRef {
    Id(CardId),
    Record {
        #[serde(alias = "sourceId", alias = "source_id", alias = "on")]
        id: CardId,
        #[serde(default, rename = "type", alias = "kind", alias = "dep_type")]
        kind: RelationType,
        #[serde(default)]
        strength: Option<f64>,
    },
}

impl TryFrom<DependencyRef> for Dependency {
    type Error = String;

    fn try_from(raw: DependencyRef) -> Result<Self, Self::Error> {
        match raw {
            DependencyRef::Id(on) => Ok(Dependency::new(on)),
            DependencyRef::Record { id, kind, strength } => Ok(Dependency {
                on: id,
                kind,
                strength: strength.map(check_strength).transpose()?,
            }),
        }
    }
}

/// Canonical directed edge: `source` must come before `target`.
///
/// For ordering types `source` is the prerequisite and `target` the dependent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub source: CardId,
    pub target: CardId,
    pub kind: RelationType,
}

/// A free-standing relationship between two cards, as analytics consume it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: RelationshipId,
    #[serde(alias = "source_id")]
    pub source_id: CardId,
    #[serde(alias = "target_id")]
    pub target_id: CardId,
    #[serde(rename = "type")]
    pub kind: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

impl Relationship {
    /// Create a relationship with a fresh id
    pub fn new(source: impl Into<CardId>, target: impl Into<CardId>, kind: RelationType) -> Self {
        Self {
            id: RelationshipId::new(),
            source_id: source.into(),
            target_id: target.into(),
            kind,
            strength: None,
        }
    }

    /// Override the id
    pub fn with_id(mut self, id: impl Into<RelationshipId>) -> Self {
        self.id = id.into();
        self
    }

    /// The canonical edge this relationship describes
    pub fn edge(&self) -> Edge {
        Edge {
            source: self.source_id.clone(),
            target: self.target_id.clone(),
            kind: self.kind,
        }
    }
}
