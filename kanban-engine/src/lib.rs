//! Ordering and dependency-integrity engine for kanban boards
//!
//! This crate keeps a board's cards in a stable order, admits or refuses card
//! moves against column WIP limits, and keeps the card dependency graph free
//! of cycles. It performs no I/O: the host owns persistence and presentation
//! and reacts to the signals the engine emits.
//!
//! ## Overview
//!
//! - **Position allocation** - Integer keys with gaps; a column is renumbered
//!   only when two neighbours leave no room between them
//! - **Move transactions** - One drag gesture per board, committed atomically
//!   or not at all
//! - **Dependency graph** - `blocks`/`depends_on` edges are checked for cycles
//!   before they are added; informational edges are tracked alongside
//! - **Analytics** - Degree statistics, hubs, isolated cards and an approximate
//!   critical path
//! - **Swimlanes** - Group cards by assignee, priority or label
//!
//! ## Basic Usage
//!
//! ```rust
//! use kanban_engine::{Board, BoardSession, Card, Column, EngineConfig, PositionAllocator};
//! use kanban_engine::{MoveOutcome, RelationType};
//!
//! # fn main() -> kanban_engine::Result<()> {
//! let allocator = PositionAllocator::default();
//! let mut board = Board::new("My Project");
//! board.add_column(Column::new("todo", "To Do", 0))?;
//! board.add_column(Column::new("done", "Done", 1))?;
//! board.add_card(Card::new("design", "todo"), &allocator)?;
//! board.add_card(Card::new("build", "todo"), &allocator)?;
//!
//! let mut session = BoardSession::new(board, EngineConfig::default())?;
//!
//! // "build" cannot start before "design"
//! session.add_dependency(&"design".into(), &"build".into(), RelationType::DependsOn)?;
//! assert!(session
//!     .add_dependency(&"build".into(), &"design".into(), RelationType::Blocks)
//!     .is_err());
//!
//! session.begin_move(&"design".into())?;
//! session.retarget_move(&"done".into())?;
//! let outcome = session.commit_move(&"done".into(), 0)?;
//! assert!(matches!(outcome, MoveOutcome::Committed { .. }));
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod analytics;
pub mod config;
mod error;
pub mod graph;
pub mod logging;
pub mod session;
pub mod swimlane;
pub mod transaction;
pub mod types;

pub use allocator::{calculate_drop_position, Allocation, PositionAllocator};
pub use analytics::{
    calculate_graph_stats, find_critical_path, CriticalPath, GraphAnalytics, GraphStats,
};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use graph::{
    add_dependency, remove_dependency, would_create_circular_dependency, DependencyGraph,
};
pub use session::{BoardSession, MoveOutcome};
pub use swimlane::{project_swimlanes, GroupBy, Swimlane};
pub use transaction::{ActiveMove, MoveTransaction};

// Re-export commonly used types
pub use types::{
    Board, BoardEvent, BoardObserver, Card, CardId, Column, ColumnId, Dependency, Edge,
    EventRecord, Position, Priority, RelationType, Relationship, RelationshipId, WipLimitType,
};
