//! Payment-notification record state.

use serde::{Deserialize, Serialize};

/// State of a payment-notification record.
///
/// Exactly one terminal transition is ever applied per record:
/// `Pending -> Completed` or `Pending -> Failed`. The terminal states
/// accept no further transitions, which is what makes replayed
/// notifications no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationState {
    Pending,
    Completed,
    Failed,
}

impl NotificationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NotificationState::Completed | NotificationState::Failed
        )
    }

    pub fn can_transition_to(&self, target: NotificationState) -> bool {
        matches!(
            (self, target),
            (
                NotificationState::Pending,
                NotificationState::Completed | NotificationState::Failed
            )
        )
    }

    /// Database column representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationState::Pending => "pending",
            NotificationState::Completed => "completed",
            NotificationState::Failed => "failed",
        }
    }

    /// Parse the database column representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(NotificationState::Pending),
            "completed" => Some(NotificationState::Completed),
            "failed" => Some(NotificationState::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reaches_both_terminal_states() {
        assert!(NotificationState::Pending.can_transition_to(NotificationState::Completed));
        assert!(NotificationState::Pending.can_transition_to(NotificationState::Failed));
    }

    #[test]
    fn terminal_states_accept_no_transition() {
        for terminal in [NotificationState::Completed, NotificationState::Failed] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(NotificationState::Completed));
            assert!(!terminal.can_transition_to(NotificationState::Failed));
            assert!(!terminal.can_transition_to(NotificationState::Pending));
        }
    }

    #[test]
    fn self_transition_is_illegal() {
        assert!(!NotificationState::Pending.can_transition_to(NotificationState::Pending));
    }

    #[test]
    fn column_representation_round_trips() {
        for state in [
            NotificationState::Pending,
            NotificationState::Completed,
            NotificationState::Failed,
        ] {
            assert_eq!(NotificationState::parse(state.as_str()), Some(state));
        }
        assert_eq!(NotificationState::parse("cancelled"), None);
    }
}
