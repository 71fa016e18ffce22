//! Logging helpers
//!
//! The engine only emits `tracing` events; installing a subscriber is the
//! host's job.

use serde::Serialize;
use std::fmt::Debug;

/// Wrapper for pretty-printing values in logs as YAML
///
/// ```
/// use kanban_engine::logging::Pretty;
///
/// let ids = vec!["a", "b"];
/// tracing::debug!("renumbered column: {}", Pretty(&ids));
/// ```
///
/// Outputs YAML with a leading newline. Debug is used as a fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
