//! Strongly typed identifiers.
//!
//! Ids are opaque strings. Hosts may supply their own (`from_string`); ids
//! minted by the engine are ULIDs.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Mint a new unique id
            pub fn new() -> Self {
                Self(ulid::Ulid::new().to_string())
            }

            /// Wrap an existing id string
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifies a card
    CardId
);
define_id!(
    /// Identifies a column
    ColumnId
);
define_id!(
    /// Identifies a relationship between two cards
    RelationshipId
);
define_id!(
    /// Identifies an entry in the session event log
    EventId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_ulids() {
        let id = CardId::new();
        assert_eq!(id.as_str().len(), 26);
        assert_ne!(id, CardId::new());
    }

    #[test]
    fn test_from_string_and_display() {
        let id = ColumnId::from_string("doing");
        assert_eq!(id.as_str(), "doing");
        assert_eq!(id.to_string(), "doing");
        assert_eq!(ColumnId::from("doing"), id);
    }

    #[test]
    fn test_ids_order_by_string() {
        let mut ids = vec![CardId::from("b"), CardId::from("a"), CardId::from("c")];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(CardId::as_str).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_serializes_transparently() {
        let id = RelationshipId::from_string("r1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"r1\"");
        let parsed: RelationshipId = serde_json::from_str("\"r1\"").unwrap();
        assert_eq!(parsed, id);
    }
}
