//! Card types

use super::dependency::{Dependency, RelationType};
use super::ids::{CardId, ColumnId};
use super::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card priority, used for swimlane grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Display title
    pub fn title(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    #[serde(default)]
    pub title: String,
    pub column_id: ColumnId,
    pub position: Position,

    /// Prerequisites of this card; this card is the dependent side of each
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub labels: Vec<String>,

    /// Estimate in hours; only summed by the approximate critical path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
}

impl Card {
    /// Create a card in the given column. The position is provisional until
    /// the card is placed on a board.
    pub fn new(id: impl Into<CardId>, column: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            column_id: column.into(),
            position: Position::default(),
            dependencies: Vec::new(),
            assignee: None,
            priority: None,
            labels: Vec::new(),
            estimated_hours: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the position key
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Position::new(position);
        self
    }

    /// Set the assignee
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Add a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Set the estimate
    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Add a plain "depends on" prerequisite
    pub fn with_dependency(mut self, on: impl Into<CardId>) -> Self {
        self.dependencies.push(Dependency::new(on));
        self
    }

    /// Find the dependency entry naming `on` as prerequisite
    pub fn dependency_on(&self, on: &CardId) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| &d.on == on)
    }

    /// Prerequisites reached through ordering edges
    pub fn ordering_prerequisites(&self) -> impl Iterator<Item = &CardId> {
        self.dependencies
            .iter()
            .filter(|d| d.kind.is_ordering())
            .map(|d| &d.on)
    }

    /// Whether this card depends on `on` with the given relation type
    pub fn has_dependency(&self, on: &CardId, kind: RelationType) -> bool {
        self.dependencies
            .iter()
            .any(|d| &d.on == on && d.kind == kind)
    }
}
