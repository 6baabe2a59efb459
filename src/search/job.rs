//! Search job phase machine.

use serde::{Deserialize, Serialize};

/// Phase of the price-search flow.
///
/// A new submission is reachable from `Committed`, `Failed`, and (through
/// `Canceling`) any active phase; `Canceling` always lands back in `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// No job held.
    #[default]
    Idle,
    /// Start request in flight.
    Starting,
    /// Job token held, waiting for the server's poll time.
    Waiting,
    /// Results poll in flight.
    Polling,
    /// A result set was committed.
    Committed,
    /// The poll exhausted its retries.
    Failed,
    /// Stopping the previous job before it is cleared.
    Canceling,
}

impl SearchPhase {
    /// Check whether this phase may transition to `target`.
    pub fn can_transition_to(&self, target: SearchPhase) -> bool {
        use SearchPhase::*;

        matches!(
            (self, target),
            (Idle, Starting)
                | (Starting, Waiting)
                | (Starting, Idle)
                | (Starting, Canceling)
                | (Waiting, Polling)
                | (Waiting, Canceling)
                | (Polling, Committed)
                | (Polling, Failed)
                | (Polling, Canceling)
                | (Committed, Starting)
                | (Committed, Idle)
                | (Failed, Starting)
                | (Failed, Canceling)
                | (Failed, Idle)
                | (Canceling, Idle)
        )
    }

    /// A job or cancellation is in progress.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Starting | Self::Waiting | Self::Polling | Self::Canceling
        )
    }

    /// The last cycle reached a terminal outcome.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Committed | Self::Failed)
    }
}

impl std::fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Waiting => "waiting",
            Self::Polling => "polling",
            Self::Committed => "committed",
            Self::Failed => "failed",
            Self::Canceling => "canceling",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        assert!(SearchPhase::Idle.can_transition_to(SearchPhase::Starting));
        assert!(SearchPhase::Starting.can_transition_to(SearchPhase::Waiting));
        assert!(SearchPhase::Waiting.can_transition_to(SearchPhase::Polling));
        assert!(SearchPhase::Polling.can_transition_to(SearchPhase::Committed));
    }

    #[test]
    fn resubmission_transitions() {
        assert!(SearchPhase::Committed.can_transition_to(SearchPhase::Starting));
        assert!(SearchPhase::Failed.can_transition_to(SearchPhase::Starting));
        assert!(SearchPhase::Failed.can_transition_to(SearchPhase::Canceling));
    }

    #[test]
    fn canceling_always_lands_idle() {
        for phase in [
            SearchPhase::Starting,
            SearchPhase::Waiting,
            SearchPhase::Polling,
        ] {
            assert!(phase.can_transition_to(SearchPhase::Canceling), "{phase}");
        }
        assert!(SearchPhase::Canceling.can_transition_to(SearchPhase::Idle));
    }

    #[test]
    fn invalid_transitions() {
        assert!(!SearchPhase::Idle.can_transition_to(SearchPhase::Polling));
        assert!(!SearchPhase::Committed.can_transition_to(SearchPhase::Polling));
        assert!(!SearchPhase::Waiting.can_transition_to(SearchPhase::Starting));
        assert!(!SearchPhase::Canceling.can_transition_to(SearchPhase::Waiting));
    }

    #[test]
    fn activity_queries() {
        assert!(SearchPhase::Waiting.is_active());
        assert!(SearchPhase::Canceling.is_active());
        assert!(!SearchPhase::Idle.is_active());
        assert!(SearchPhase::Committed.is_settled());
        assert!(SearchPhase::Failed.is_settled());
        assert!(!SearchPhase::Polling.is_settled());
    }

    #[test]
    fn phase_serde_roundtrip() {
        let json = serde_json::to_string(&SearchPhase::Waiting).unwrap();
        assert_eq!(json, "\"waiting\"");
        let parsed: SearchPhase = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, SearchPhase::Waiting);
    }
}
