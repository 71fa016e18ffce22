//! A board session: one board, one gesture at a time, and the signals that
//! leave the engine.
//!
//! Every mutating operation runs its checks first and writes only once all
//! of them pass, so an `Err` always means the board is untouched. Observers
//! and the event log see a signal only after the outcome is final.

use crate::allocator::PositionAllocator;
use crate::analytics::{calculate_graph_stats, find_critical_path, CriticalPath, GraphStats};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::graph::{drop_dependency, upsert_dependency, DependencyGraph};
use crate::swimlane::{project_swimlanes, GroupBy, Swimlane};
use crate::transaction::{ActiveMove, MoveTransaction};
use crate::types::{
    check_strength, Board, BoardEvent, BoardObserver, Card, CardId, ColumnId, Dependency,
    EventRecord, Position, RelationType,
};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Result of `commit_move`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The card now lives at `position`, at `index` within `column`
    Committed {
        card: CardId,
        column: ColumnId,
        position: Position,
        index: usize,
        /// Whether the target column was renumbered to make room
        renumbered: bool,
    },
    /// No gesture was active; nothing happened
    Idle,
}

/// Owns a board and the single move transaction allowed on it
pub struct BoardSession {
    board: Board,
    transaction: MoveTransaction,
    config: EngineConfig,
    allocator: PositionAllocator,
    observers: Vec<Box<dyn BoardObserver>>,
    events: Vec<EventRecord>,
}

impl fmt::Debug for BoardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardSession")
            .field("board", &self.board.name)
            .field("transaction", &self.transaction)
            .field("observers", &self.observers.len())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl BoardSession {
    /// Start a session. The config is validated and the board must satisfy
    /// every integrity invariant.
    pub fn new(board: Board, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        board.verify_integrity()?;
        debug!(board = %board.name, cards = board.card_count(), "board session started");
        Ok(Self {
            board,
            transaction: MoveTransaction::Idle,
            allocator: PositionAllocator::from_config(&config),
            config,
            observers: Vec::new(),
            events: Vec::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transaction(&self) -> &MoveTransaction {
        &self.transaction
    }

    /// Signals emitted so far, oldest first
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Register an observer for outbound signals
    pub fn subscribe(&mut self, observer: Box<dyn BoardObserver>) {
        self.observers.push(observer);
    }

    /// End the session and hand the board back
    pub fn into_board(self) -> Board {
        self.board
    }

    // --- Move transaction ---

    /// Start dragging `card`
    pub fn begin_move(&mut self, card: &CardId) -> Result<()> {
        if self.transaction.is_active() {
            return Err(EngineError::invalid_state(
                "begin a move",
                self.transaction.state_name(),
            ));
        }
        let card = self
            .board
            .card(card)
            .ok_or_else(|| EngineError::CardNotFound { id: card.to_string() })?;
        self.transaction
            .begin(card.id.clone(), card.column_id.clone(), card.position)?;
        debug!(card = %card.id, column = %card.column_id, "move started");
        Ok(())
    }

    /// Point the active gesture at another column; no board mutation
    pub fn retarget_move(&mut self, column: &ColumnId) -> Result<()> {
        if !self.transaction.is_active() {
            return Err(EngineError::invalid_state(
                "retarget a move",
                self.transaction.state_name(),
            ));
        }
        if self.board.column(column).is_none() {
            return Err(EngineError::ColumnNotFound {
                id: column.to_string(),
            });
        }
        self.transaction.retarget(column.clone())
    }

    /// Drop the dragged card into `target` at `index`.
    ///
    /// The gesture ends whatever the outcome. From Idle this is a no-op that
    /// returns [`MoveOutcome::Idle`].
    pub fn commit_move(&mut self, target: &ColumnId, index: usize) -> Result<MoveOutcome> {
        let Some(active) = self.transaction.take() else {
            debug!(%target, "commit with no active move ignored");
            return Ok(MoveOutcome::Idle);
        };
        self.commit(active, target, index)
    }

    /// Abandon the gesture. Returns whether one was active.
    pub fn cancel_move(&mut self) -> bool {
        let cancelled = self.transaction.cancel();
        if cancelled {
            debug!("move cancelled");
        }
        cancelled
    }

    /// Begin and commit in one step
    pub fn move_card(
        &mut self,
        card: &CardId,
        target: &ColumnId,
        index: usize,
    ) -> Result<MoveOutcome> {
        self.begin_move(card)?;
        self.commit_move(target, index)
    }

    fn commit(
        &mut self,
        active: ActiveMove,
        target: &ColumnId,
        index: usize,
    ) -> Result<MoveOutcome> {
        let card = self
            .board
            .card(&active.card)
            .ok_or_else(|| EngineError::CardNotFound {
                id: active.card.to_string(),
            })?;
        let source = card.column_id.clone();
        let target_column = self
            .board
            .column(target)
            .ok_or_else(|| EngineError::ColumnNotFound {
                id: target.to_string(),
            })?;
        let source_column = self
            .board
            .column(&source)
            .ok_or_else(|| EngineError::ColumnNotFound {
                id: source.to_string(),
            })?;
        if source_column.index_of(&active.card).is_none() {
            return Err(EngineError::integrity(format!(
                "card '{}' is not listed by its column '{}'",
                active.card, source
            )));
        }

        let remaining: Vec<&CardId> = target_column
            .card_ids
            .iter()
            .filter(|id| **id != active.card)
            .collect();
        let existing: Vec<Position> = remaining
            .iter()
            .filter_map(|id| self.board.card(id))
            .map(|c| c.position)
            .collect();
        if existing.len() != remaining.len() {
            return Err(EngineError::integrity(format!(
                "column '{}' lists cards that are not on the board",
                target
            )));
        }
        let allocation = self.allocator.allocate(&existing, index);

        if &source != target && target_column.is_at_hard_limit() {
            let limit = target_column.wip_limit.unwrap_or_default();
            warn!(card = %active.card, column = %target, limit, "move rejected by hard WIP limit");
            self.emit(BoardEvent::WipLimitExceeded {
                column: target.clone(),
                card: active.card.clone(),
            });
            return Err(EngineError::WipLimitExceeded {
                column: target.to_string(),
                card: active.card.to_string(),
                limit,
            });
        }

        // All checks passed; nothing below can fail.
        if let Some(column) = self.board.column_mut(&source) {
            column.card_ids.retain(|id| id != &active.card);
        }
        if let Some(keys) = &allocation.renumbered {
            self.board.apply_positions(target, keys);
        }
        if let Some(column) = self.board.column_mut(target) {
            column.card_ids.insert(allocation.index, active.card.clone());
        }
        if let Some(card) = self.board.card_mut(&active.card) {
            card.column_id = target.clone();
            card.position = allocation.position;
        }

        info!(
            card = %active.card,
            from = %source,
            to = %target,
            position = %allocation.position,
            renumbered = allocation.renumbered.is_some(),
            "move committed"
        );
        self.emit(BoardEvent::Committed {
            card: active.card.clone(),
            column: target.clone(),
            position: allocation.position,
        });

        Ok(MoveOutcome::Committed {
            card: active.card,
            column: target.clone(),
            position: allocation.position,
            index: allocation.index,
            renumbered: allocation.renumbered.is_some(),
        })
    }

    // --- Dependencies ---

    /// Make `to` depend on `from`.
    ///
    /// Ordering kinds are rejected with `Cycle { target: to }` when they would
    /// close a cycle; the board is unchanged and `on_cycle_rejected` fires.
    pub fn add_dependency(&mut self, from: &CardId, to: &CardId, kind: RelationType) -> Result<()> {
        self.add_dependency_record(to, Dependency::new(from.clone()).with_kind(kind))
    }

    /// Add (or update) a full dependency record on card `to`
    pub fn add_dependency_record(&mut self, to: &CardId, dependency: Dependency) -> Result<()> {
        self.ensure_idle("add a dependency")?;
        if let Some(strength) = dependency.strength {
            check_strength(strength).map_err(|m| EngineError::invalid_value("strength", m))?;
        }
        let from = dependency.on.clone();
        if self.board.card(&from).is_none() {
            return Err(EngineError::CardNotFound { id: from.to_string() });
        }
        if self.board.card(to).is_none() {
            return Err(EngineError::CardNotFound { id: to.to_string() });
        }

        match self.graph().check_insert(&from, to, dependency.kind) {
            Ok(()) => {}
            Err(err @ EngineError::Cycle { .. }) => {
                warn!(%from, %to, "dependency rejected: would create a cycle");
                self.emit(BoardEvent::CycleRejected { target: to.clone() });
                return Err(err);
            }
            Err(err) => return Err(err),
        }

        let kind = dependency.kind;
        if let Some(card) = self.board.card_mut(to) {
            upsert_dependency(card, dependency);
        }
        info!(%from, %to, %kind, "dependency added");
        Ok(())
    }

    /// Remove the dependency of `to` on `from`. Returns whether one existed.
    pub fn remove_dependency(&mut self, from: &CardId, to: &CardId) -> Result<bool> {
        self.ensure_idle("remove a dependency")?;
        let removed = self
            .board
            .card_mut(to)
            .map(|card| drop_dependency(card, from))
            .unwrap_or(false);
        if removed {
            info!(%from, %to, "dependency removed");
        }
        Ok(removed)
    }

    /// Whether making `to` depend on `from` would close a cycle
    pub fn would_create_cycle(&self, from: &CardId, to: &CardId) -> Result<bool> {
        self.graph().would_create_cycle(from, to)
    }

    /// Direct ordering prerequisites of `card`
    pub fn prerequisites_of(&self, card: &CardId) -> Vec<CardId> {
        self.graph().prerequisites_of(card).to_vec()
    }

    /// Cards directly waiting on `card`
    pub fn dependents_of(&self, card: &CardId) -> Vec<CardId> {
        self.graph().dependents_of(card).to_vec()
    }

    // --- Derived views ---

    pub fn graph_stats(&self) -> GraphStats {
        let nodes: Vec<CardId> = self.board.cards().map(|c| c.id.clone()).collect();
        calculate_graph_stats(&nodes, &self.board.relationships(), &self.config)
    }

    pub fn critical_path(&self) -> CriticalPath {
        let cards: Vec<Card> = self.board.cards().cloned().collect();
        find_critical_path(&cards, &self.board.relationships(), &self.config)
    }

    /// Lanes over the board's cards, in column then card order
    pub fn swimlanes(&self, group_by: GroupBy) -> Vec<Swimlane> {
        let ordered = self
            .board
            .columns()
            .iter()
            .flat_map(|column| self.board.cards_in(&column.id));
        project_swimlanes(ordered, group_by)
    }

    fn graph(&self) -> DependencyGraph {
        DependencyGraph::from_cards(self.board.cards())
            .with_step_limit(self.config.max_traversal_steps)
    }

    fn ensure_idle(&self, operation: &str) -> Result<()> {
        if self.transaction.is_active() {
            return Err(EngineError::invalid_state(
                operation,
                self.transaction.state_name(),
            ));
        }
        Ok(())
    }

    fn emit(&mut self, event: BoardEvent) {
        debug!(event = event.name(), "emitting board event");
        for observer in &mut self.observers {
            event.dispatch(observer.as_mut());
        }
        self.events.push(EventRecord::new(event));
    }
}
