//! Position allocation for cards dropped into a column.
//!
//! New keys go `gap` beyond the ends of a column or at the midpoint between
//! neighbours. When neighbours are adjacent integers there is no midpoint, and
//! when a head key would sink to the reserved floor (or a tail key would
//! overflow) there is no room; in those cases the whole column is renumbered
//! `gap` apart and the insertion is re-run against the fresh keys, so
//! allocation always succeeds.
//!
//! A gap too large for the column to be renumbered within `i64` is narrowed
//! to the widest step that still fits, so renumbered keys never tie.

use crate::config::{EngineConfig, DEFAULT_POSITION_FLOOR, DEFAULT_POSITION_GAP};
use crate::logging::Pretty;
use crate::types::Position;
use serde::Serialize;
use tracing::debug;

/// Result of placing one card into a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    /// Key for the inserted card
    pub position: Position,
    /// Index the card lands at, after clamping to the column length
    pub index: usize,
    /// New keys for the existing cards, in their original order, when the
    /// column had to be renumbered
    pub renumbered: Option<Vec<Position>>,
}

/// Computes ordering keys for insertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionAllocator {
    gap: i64,
    floor: i64,
}

impl Default for PositionAllocator {
    fn default() -> Self {
        Self {
            gap: DEFAULT_POSITION_GAP,
            floor: DEFAULT_POSITION_FLOOR,
        }
    }
}

impl PositionAllocator {
    /// Build an allocator from a validated config
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            gap: config.position_gap,
            floor: config.position_floor,
        }
    }

    /// The spacing used at the ends and after renumbering
    pub fn gap(&self) -> i64 {
        self.gap
    }

    /// Compute a key for a card inserted at `index` among `existing`.
    ///
    /// `existing` holds the keys of the target column in ascending order,
    /// without the card being placed. An `index` past the end appends.
    /// The same input always yields the same allocation.
    pub fn allocate(&self, existing: &[Position], index: usize) -> Allocation {
        let index = index.min(existing.len());

        if let Some(position) = self.try_insert(existing, index, self.gap) {
            return Allocation {
                position,
                index,
                renumbered: None,
            };
        }

        let step = self.step_for(existing.len());
        let fresh = spaced(existing.len(), step);
        debug!(
            count = existing.len(),
            index,
            step,
            "no room for insertion; renumbering column: {}",
            Pretty(&fresh)
        );
        // Fresh keys run `step`, `2 * step`, ... and `step * (len + 1)` fits,
        // so the head key 0 sits above the negative floor, the tail key fits,
        // and every gap of at least 2 has a midpoint.
        if let Some(position) = self.try_insert(&fresh, index, step) {
            return Allocation {
                position,
                index,
                renumbered: Some(fresh),
            };
        }

        // Only reachable with a step below 2: spread the new card in with the
        // rest instead.
        let mut keys = spaced(existing.len() + 1, self.step_for(existing.len() + 1));
        let position = keys.remove(index);
        Allocation {
            position,
            index,
            renumbered: Some(keys),
        }
    }

    /// Evenly spaced keys for `count` cards: `gap`, `2 * gap`, ...
    ///
    /// The spacing shrinks when `gap * (count + 1)` would not fit in `i64`.
    pub fn renumber(&self, count: usize) -> Vec<Position> {
        spaced(count, self.step_for(count))
    }

    /// Spacing for renumbering `count` keys, leaving room for one more at
    /// the tail
    fn step_for(&self, count: usize) -> i64 {
        let slots = i64::try_from(count).unwrap_or(i64::MAX).saturating_add(1);
        match self.gap.checked_mul(slots) {
            Some(_) => self.gap,
            None => (i64::MAX / slots).max(1),
        }
    }

    fn try_insert(&self, existing: &[Position], index: usize, gap: i64) -> Option<Position> {
        if existing.is_empty() {
            return Some(Position::new(gap));
        }
        if index == 0 {
            let key = existing[0].value().checked_sub(gap)?;
            return (key > self.floor).then_some(Position::new(key));
        }
        if index == existing.len() {
            let key = existing[index - 1].value().checked_add(gap)?;
            return Some(Position::new(key));
        }
        let left = existing[index - 1];
        let right = existing[index];
        if left >= right {
            return None;
        }
        left.midpoint(right)
    }
}

/// `step`, `2 * step`, ... for `count` keys. Callers pick `step` through
/// `step_for`, which keeps `step * (count + 1)` within range.
fn spaced(count: usize, step: i64) -> Vec<Position> {
    (1..=count as i64)
        .map(|k| Position::new(step.saturating_mul(k)))
        .collect()
}

/// Compute a drop position with the default allocator
pub fn calculate_drop_position(existing: &[Position], index: usize) -> Allocation {
    PositionAllocator::default().allocate(existing, index)
}
