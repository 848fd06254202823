//! Request lifecycle status for bulk fetches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of the most recent bulk fetch against a store.
///
/// Only `fetch_all` drives this state machine:
/// `Idle -> Loading -> Succeeded | Failed`, with `reset_status` returning to
/// `Idle` from any state. Per-item operations (create/update/remove) succeed
/// or fail through their own result and never transition this field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// No bulk fetch has run since creation or the last reset.
    #[default]
    Idle,
    /// A bulk fetch is in flight.
    Loading,
    /// The last bulk fetch replaced the cache.
    Succeeded,
    /// The last bulk fetch failed; the cache was left untouched.
    Failed,
}

impl RequestStatus {
    /// Returns true while a bulk fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if the last bulk fetch failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(RequestStatus::default(), RequestStatus::Idle);
        assert!(!RequestStatus::default().is_loading());
    }

    #[test]
    fn test_serde_is_lowercase_string() {
        let json = serde_json::to_string(&RequestStatus::Succeeded).unwrap();
        assert_eq!(json, "\"succeeded\"");
        let parsed: RequestStatus = serde_json::from_str("\"failed\"").unwrap();
        assert!(parsed.is_failed());
    }

    #[test]
    fn test_display() {
        assert_eq!(RequestStatus::Loading.to_string(), "loading");
    }
}
