//! Drag/drop gesture state.
//!
//! A [`MoveTransaction`] is plain bookkeeping: it records which card is being
//! dragged and where it currently hovers. It never touches the board; the
//! session reads it at commit time and resets it afterwards.

use crate::error::{EngineError, Result};
use crate::types::{CardId, ColumnId, Position};
use serde::Serialize;

/// The card being dragged and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveMove {
    pub card: CardId,
    pub source_column: ColumnId,
    pub source_position: Position,
    /// Tentative drop column, updated by `retarget`
    pub target_column: ColumnId,
}

/// State of the single gesture a board allows at a time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MoveTransaction {
    #[default]
    Idle,
    Active(ActiveMove),
}

impl MoveTransaction {
    /// Name of the current state, used in `InvalidState` messages
    pub fn state_name(&self) -> &'static str {
        match self {
            MoveTransaction::Idle => "idle",
            MoveTransaction::Active(_) => "active",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, MoveTransaction::Active(_))
    }

    /// The in-flight move, if any
    pub fn active(&self) -> Option<&ActiveMove> {
        match self {
            MoveTransaction::Active(active) => Some(active),
            MoveTransaction::Idle => None,
        }
    }

    /// Start a gesture. The tentative target starts as the source column.
    pub fn begin(
        &mut self,
        card: CardId,
        source_column: ColumnId,
        source_position: Position,
    ) -> Result<()> {
        if self.is_active() {
            return Err(EngineError::invalid_state("begin a move", self.state_name()));
        }
        *self = MoveTransaction::Active(ActiveMove {
            card,
            target_column: source_column.clone(),
            source_column,
            source_position,
        });
        Ok(())
    }

    /// Update the tentative target
    pub fn retarget(&mut self, column: ColumnId) -> Result<()> {
        match self {
            MoveTransaction::Active(active) => {
                active.target_column = column;
                Ok(())
            }
            MoveTransaction::Idle => Err(EngineError::invalid_state(
                "retarget a move",
                self.state_name(),
            )),
        }
    }

    /// End the gesture, returning what was in flight
    pub fn take(&mut self) -> Option<ActiveMove> {
        match std::mem::take(self) {
            MoveTransaction::Active(active) => Some(active),
            MoveTransaction::Idle => None,
        }
    }

    /// Drop the gesture. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        self.take().is_some()
    }
}
