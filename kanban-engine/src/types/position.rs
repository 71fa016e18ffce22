//! Position keys for card ordering within a column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordering key of a card inside its column.
///
/// Keys are integers so that two adjacent keys (`1000`, `1001`) have no
/// representable midpoint; the allocator detects that and renumbers the
/// column. Keys only need to be unique within one column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Position(i64);

impl Position {
    /// Wrap a raw key
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw key
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Midpoint between two keys, rounded down.
    ///
    /// Computed in 128-bit space so keys at opposite ends of the range cannot
    /// overflow. Returns `None` when no integer lies strictly between them.
    pub fn midpoint(self, other: Position) -> Option<Position> {
        let (low, high) = if self <= other {
            (self.0, other.0)
        } else {
            (other.0, self.0)
        };
        let mid = (low as i128 + (high as i128 - low as i128) / 2) as i64;
        if mid <= low || mid >= high {
            None
        } else {
            Some(Position(mid))
        }
    }
}

impl From<i64> for Position {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
