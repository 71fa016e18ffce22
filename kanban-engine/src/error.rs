//! Error types for the kanban engine

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur in engine operations.
///
/// Every error is returned before any board state is touched, so a caller
/// holding an `Err` can rely on the board being exactly as it was.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Operation attempted outside its valid state-machine state
    #[error("invalid state: cannot {operation} while {state}")]
    InvalidState { operation: String, state: String },

    /// Hard WIP admission control rejected a cross-column move
    #[error(
        "column '{column}' is at its hard WIP limit of {limit}; card '{card}' was not admitted"
    )]
    WipLimitExceeded {
        column: String,
        card: String,
        limit: usize,
    },

    /// Dependency insertion would close a cycle at `target`
    #[error("dependency would create a cycle at card '{target}'")]
    Cycle { target: String },

    /// A board invariant was found false before a mutation was attempted
    #[error("integrity violation: {message}")]
    IntegrityViolation { message: String },

    /// Card not found
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// Column not found
    #[error("column not found: {id}")]
    ColumnNotFound { id: String },

    /// Duplicate ID
    #[error("duplicate {item_type} ID: {id}")]
    DuplicateId { item_type: String, id: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl EngineError {
    /// Create an invalid state error
    pub fn invalid_state(operation: impl Into<String>, state: impl Into<String>) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            state: state.into(),
        }
    }

    /// Create an integrity violation error
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::IntegrityViolation {
            message: message.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate ID error
    pub fn duplicate_id(item_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            item_type: item_type.into(),
            id: id.into(),
        }
    }

    /// Check if this is an admission-control refusal rather than a fault
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::WipLimitExceeded { .. } | Self::Cycle { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::CardNotFound {
            id: "abc123".into(),
        };
        assert_eq!(err.to_string(), "card not found: abc123");
    }

    #[test]
    fn test_wip_error_names_column_and_card() {
        let err = EngineError::WipLimitExceeded {
            column: "doing".into(),
            card: "c4".into(),
            limit: 3,
        };
        let message = err.to_string();
        assert!(message.contains("doing"));
        assert!(message.contains("c4"));
        assert!(message.contains('3'));
    }

    #[test]
    fn test_invalid_state() {
        let err = EngineError::invalid_state("begin move", "a move is active");
        assert_eq!(
            err.to_string(),
            "invalid state: cannot begin move while a move is active"
        );
    }

    #[test]
    fn test_rejection() {
        assert!(EngineError::Cycle { target: "a".into() }.is_rejection());
        assert!(EngineError::WipLimitExceeded {
            column: "c".into(),
            card: "x".into(),
            limit: 1
        }
        .is_rejection());
        assert!(!EngineError::integrity("broken").is_rejection());
        assert!(!EngineError::CardNotFound { id: "x".into() }.is_rejection());
    }
}
