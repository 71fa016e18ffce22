//! Engine configuration
//!
//! Tunables for position allocation, graph traversal and analytics. Values
//! come from code (`EngineConfig::default()`) or from a YAML document supplied
//! by the host; either way they pass through [`EngineConfig::validate`] before
//! the engine uses them.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Baseline spacing between allocated position keys
pub const DEFAULT_POSITION_GAP: i64 = 1000;

/// Reserved floor below which head insertions fall through to renumbering
pub const DEFAULT_POSITION_FLOOR: i64 = -(1 << 60);

/// Upper bound on nodes visited by a single graph traversal
pub const DEFAULT_MAX_TRAVERSAL_STEPS: usize = 100_000;

/// Configuration for the kanban engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Spacing between keys handed out at the ends of a column and after renumbering
    pub position_gap: i64,
    /// Head insertions at or below this key renumber the column instead
    pub position_floor: i64,
    /// Traversal budget for cycle checks
    pub max_traversal_steps: usize,
    /// How many hub nodes graph stats report
    pub hub_count: usize,
    /// How many cards the approximate critical path keeps
    pub critical_path_length: usize,
    /// How many of the critical path members are reported as bottlenecks
    pub bottleneck_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            position_gap: DEFAULT_POSITION_GAP,
            position_floor: DEFAULT_POSITION_FLOOR,
            max_traversal_steps: DEFAULT_MAX_TRAVERSAL_STEPS,
            hub_count: 5,
            critical_path_length: 5,
            bottleneck_count: 2,
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document and validate the result.
    ///
    /// Missing keys take their default values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Check that the configuration can uphold the allocator guarantees.
    ///
    /// A gap below 2 leaves no integer strictly between two renumbered keys,
    /// and a non-negative floor would reject the head key produced right
    /// after renumbering.
    pub fn validate(&self) -> Result<()> {
        if self.position_gap < 2 {
            return Err(EngineError::invalid_value(
                "position_gap",
                format!("must be at least 2, got {}", self.position_gap),
            ));
        }
        if self.position_floor >= 0 {
            return Err(EngineError::invalid_value(
                "position_floor",
                format!("must be negative, got {}", self.position_floor),
            ));
        }
        if self.max_traversal_steps == 0 {
            return Err(EngineError::invalid_value(
                "max_traversal_steps",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}
