//! Core types for the kanban engine

mod board;
mod card;
mod column;
mod dependency;
mod event;
mod ids;
mod position;

// Re-export all types
pub use board::Board;
pub use card::{Card, Priority};
pub use column::{Column, WipLimitType};
pub use dependency::{Dependency, Edge, RelationType, Relationship};
pub(crate) use dependency::check_strength;
pub use event::{BoardEvent, BoardObserver, EventRecord};
pub use ids::{CardId, ColumnId, EventId, RelationshipId};
pub use position::Position;
