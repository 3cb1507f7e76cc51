//! Correlation ID attached to every operation for log correlation.
//!
//! UUID v7, so ids sort by creation time. When a submit ends ambiguously the
//! id is the handle an operator uses to reconcile against the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let first = CorrelationId::new();
        let second = CorrelationId::new();
        assert_ne!(first, second);
        assert_eq!(first.0.get_version_num(), 7);
    }

    #[test]
    fn test_display_is_hyphenated_uuid() {
        let id = CorrelationId::new();
        assert_eq!(Uuid::parse_str(&id.to_string()).unwrap(), id.0);
    }
}
