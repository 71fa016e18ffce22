//! Outbound signals and the session event log

use super::ids::{CardId, ColumnId, EventId};
use super::position::Position;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signal emitted to the host once a decision is final
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A move was committed
    Committed {
        card: CardId,
        column: ColumnId,
        position: Position,
    },
    /// A move was refused by a hard WIP limit
    WipLimitExceeded { column: ColumnId, card: CardId },
    /// A dependency was refused because it would close a cycle
    CycleRejected { target: CardId },
}

impl BoardEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            BoardEvent::Committed { .. } => "committed",
            BoardEvent::WipLimitExceeded { .. } => "wip_limit_exceeded",
            BoardEvent::CycleRejected { .. } => "cycle_rejected",
        }
    }

    /// Deliver this event to an observer
    pub fn dispatch(&self, observer: &mut dyn BoardObserver) {
        match self {
            BoardEvent::Committed {
                card,
                column,
                position,
            } => observer.on_committed(card, column, *position),
            BoardEvent::WipLimitExceeded { column, card } => {
                observer.on_wip_limit_exceeded(column, card)
            }
            BoardEvent::CycleRejected { target } => observer.on_cycle_rejected(target),
        }
    }
}

/// A logged event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique ID for this record
    pub id: EventId,

    /// When the event was emitted
    pub timestamp: DateTime<Utc>,

    pub event: BoardEvent,
}

impl EventRecord {
    /// Record an event now
    pub fn new(event: BoardEvent) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Receives board signals. All methods default to doing nothing.
pub trait BoardObserver {
    /// A move was committed
    fn on_committed(&mut self, _card: &CardId, _column: &ColumnId, _position: Position) {}

    /// A move was refused by a hard WIP limit
    fn on_wip_limit_exceeded(&mut self, _column: &ColumnId, _card: &CardId) {}

    /// A dependency was refused because it would close a cycle at `target`
    fn on_cycle_rejected(&mut self, _target: &CardId) {}
}
