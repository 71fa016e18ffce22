//! Board: the container of columns and cards and the unit of atomicity.

use super::card::Card;
use super::column::Column;
use super::dependency::Relationship;
use super::ids::{CardId, ColumnId, RelationshipId};
use super::position::Position;
use crate::allocator::PositionAllocator;
use crate::error::{EngineError, Result};
use crate::graph::DependencyGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A kanban board snapshot.
///
/// Columns are kept sorted by their `position`. The engine only ever changes
/// card `position`/`column_id`, column `card_ids`, and card dependency lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
    columns: Vec<Column>,
    cards: BTreeMap<CardId, Card>,
}

impl Board {
    /// Create an empty board
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            cards: BTreeMap::new(),
        }
    }

    /// Assemble a board from host-supplied parts and verify every invariant.
    ///
    /// Columns must already list their cards in `card_ids`.
    pub fn from_parts(
        name: impl Into<String>,
        columns: Vec<Column>,
        cards: Vec<Card>,
    ) -> Result<Self> {
        let mut board = Self::new(name);

        let mut seen = HashSet::new();
        for column in columns {
            if !seen.insert(column.id.clone()) {
                return Err(EngineError::duplicate_id("column", column.id.as_str()));
            }
            board.columns.push(column);
        }
        board.columns.sort_by_key(|c| c.position);

        for card in cards {
            if board.cards.contains_key(&card.id) {
                return Err(EngineError::duplicate_id("card", card.id.as_str()));
            }
            board.cards.insert(card.id.clone(), card);
        }

        board.verify_integrity()?;
        Ok(board)
    }

    /// Add an empty column
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.column(&column.id).is_some() {
            return Err(EngineError::duplicate_id("column", column.id.as_str()));
        }
        if !column.card_ids.is_empty() {
            return Err(EngineError::integrity(format!(
                "column '{}' must be added empty",
                column.id
            )));
        }
        self.columns.push(column);
        self.columns.sort_by_key(|c| c.position);
        Ok(())
    }

    /// Place a new card at the end of its column, assigning its position.
    ///
    /// The card's dependency list is checked so the board stays acyclic.
    pub fn add_card(&mut self, mut card: Card, allocator: &PositionAllocator) -> Result<Position> {
        if self.cards.contains_key(&card.id) {
            return Err(EngineError::duplicate_id("card", card.id.as_str()));
        }
        let column = self
            .column(&card.column_id)
            .ok_or_else(|| EngineError::ColumnNotFound {
                id: card.column_id.to_string(),
            })?;

        let existing = self.positions_in(column);
        let allocation = allocator.allocate(&existing, existing.len());

        let graph = DependencyGraph::from_cards(self.cards.values().chain(std::iter::once(&card)));
        if let Some(node) = graph.find_cycle()? {
            return Err(EngineError::Cycle {
                target: node.to_string(),
            });
        }

        let column_id = card.column_id.clone();
        if let Some(keys) = allocation.renumbered {
            self.apply_positions(&column_id, &keys);
        }
        card.position = allocation.position;
        let position = card.position;
        if let Some(column) = self.column_mut(&column_id) {
            column.card_ids.push(card.id.clone());
        }
        self.cards.insert(card.id.clone(), card);
        Ok(position)
    }

    /// Columns in board order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// All cards, ordered by id
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Number of cards on the board
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Find a column by ID
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// Find a card by ID
    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    /// Cards of a column in `card_ids` order
    pub fn cards_in(&self, column: &ColumnId) -> Vec<&Card> {
        self.column(column)
            .map(|c| c.card_ids.iter().filter_map(|id| self.cards.get(id)).collect())
            .unwrap_or_default()
    }

    /// Position keys of a column's cards in `card_ids` order
    pub fn positions_in(&self, column: &Column) -> Vec<Position> {
        column
            .card_ids
            .iter()
            .filter_map(|id| self.cards.get(id))
            .map(|card| card.position)
            .collect()
    }

    /// Card dependencies as free-standing relationships.
    ///
    /// Ids are derived from the endpoints (`"{source}->{target}"`), so they are
    /// stable across calls.
    pub fn relationships(&self) -> Vec<Relationship> {
        self.cards
            .values()
            .flat_map(|card| {
                card.dependencies.iter().map(move |dep| Relationship {
                    id: RelationshipId::from_string(format!("{}->{}", dep.on, card.id)),
                    source_id: dep.on.clone(),
                    target_id: card.id.clone(),
                    kind: dep.kind,
                    strength: dep.strength,
                })
            })
            .collect()
    }

    /// Check invariants 1-3: membership mirroring, strict position order and
    /// acyclic ordering dependencies.
    pub fn verify_integrity(&self) -> Result<()> {
        let mut placed: HashSet<&CardId> = HashSet::new();

        for column in &self.columns {
            let mut previous: Option<Position> = None;
            for id in &column.card_ids {
                let card = self.cards.get(id).ok_or_else(|| {
                    EngineError::integrity(format!(
                        "column '{}' lists unknown card '{}'",
                        column.id, id
                    ))
                })?;
                if card.column_id != column.id {
                    return Err(EngineError::integrity(format!(
                        "card '{}' is listed in column '{}' but belongs to '{}'",
                        id, column.id, card.column_id
                    )));
                }
                if !placed.insert(id) {
                    return Err(EngineError::integrity(format!(
                        "card '{}' is listed more than once",
                        id
                    )));
                }
                if let Some(prev) = previous {
                    if card.position <= prev {
                        return Err(EngineError::integrity(format!(
                            "positions in column '{}' are not strictly increasing at card '{}'",
                            column.id, id
                        )));
                    }
                }
                previous = Some(card.position);
            }
            if column.is_over_limit() {
                tracing::warn!(
                    column = %column.id,
                    count = column.len(),
                    limit = ?column.wip_limit,
                    "column holds more cards than its WIP limit"
                );
            }
        }

        if let Some(orphan) = self.cards.keys().find(|id| !placed.contains(id)) {
            return Err(EngineError::integrity(format!(
                "card '{}' is not listed by its column",
                orphan
            )));
        }

        if let Some(node) = DependencyGraph::from_cards(self.cards.values()).find_cycle()? {
            return Err(EngineError::integrity(format!(
                "dependency cycle through card '{}'",
                node
            )));
        }

        Ok(())
    }

    pub(crate) fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| &c.id == id)
    }

    pub(crate) fn card_mut(&mut self, id: &CardId) -> Option<&mut Card> {
        self.cards.get_mut(id)
    }

    /// Overwrite the keys of a column's cards, in `card_ids` order
    pub(crate) fn apply_positions(&mut self, column: &ColumnId, keys: &[Position]) {
        let ids = match self.column(column) {
            Some(c) => c.card_ids.clone(),
            None => return,
        };
        for (id, key) in ids.iter().zip(keys) {
            if let Some(card) = self.cards.get_mut(id) {
                card.position = *key;
            }
        }
    }
}
