//! Column types

use super::ids::{CardId, ColumnId};
use serde::{Deserialize, Serialize};

/// How a column's WIP limit is enforced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WipLimitType {
    /// Informational only; moves are never blocked
    #[default]
    Soft,
    /// Cross-column moves into a full column are rejected
    Hard,
}

/// A column defines a workflow stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    #[serde(default)]
    pub name: String,
    /// Ordering among columns
    #[serde(default)]
    pub position: usize,
    /// Member cards in position order
    #[serde(default)]
    pub card_ids: Vec<CardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<usize>,
    #[serde(default)]
    pub wip_limit_type: WipLimitType,
}

impl Column {
    /// Create an empty column with no WIP limit
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>, position: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            card_ids: Vec::new(),
            wip_limit: None,
            wip_limit_type: WipLimitType::Soft,
        }
    }

    /// Set the WIP limit and how it is enforced
    pub fn with_wip_limit(mut self, limit: usize, kind: WipLimitType) -> Self {
        self.wip_limit = Some(limit);
        self.wip_limit_type = kind;
        self
    }

    /// Number of member cards
    pub fn len(&self) -> usize {
        self.card_ids.len()
    }

    /// Whether the column holds no cards
    pub fn is_empty(&self) -> bool {
        self.card_ids.is_empty()
    }

    /// Index of a member card
    pub fn index_of(&self, card: &CardId) -> Option<usize> {
        self.card_ids.iter().position(|id| id == card)
    }

    /// Whether admitting one more card would break a hard WIP limit
    pub fn is_at_hard_limit(&self) -> bool {
        match (self.wip_limit_type, self.wip_limit) {
            (WipLimitType::Hard, Some(limit)) => self.card_ids.len() >= limit,
            _ => false,
        }
    }

    /// Whether the column holds more cards than its limit, of either kind
    pub fn is_over_limit(&self) -> bool {
        self.wip_limit
            .is_some_and(|limit| self.card_ids.len() > limit)
    }
}
