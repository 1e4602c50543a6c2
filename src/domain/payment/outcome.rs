//! Outcome classification from the gateway status code.

use serde::{Deserialize, Serialize};

use super::state::NotificationState;

/// Business outcome of a notification, derived purely from the
/// `code-retour` status string and never from any other field.
///
/// `Unknown` is not an error: unrecognized statuses are acknowledged to the
/// gateway and recorded, but cause no state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationOutcome {
    Paid,
    Failed,
    Refunded,
    Unknown,
}

impl NotificationOutcome {
    /// Classify a raw status code. Matching is case-insensitive; the fixed
    /// lookup is the only classification policy in the system.
    pub fn classify(status_code: &str) -> Self {
        match status_code.to_ascii_lowercase().as_str() {
            "payetest" | "paiement" => NotificationOutcome::Paid,
            "annulation" => NotificationOutcome::Failed,
            "remboursement" => NotificationOutcome::Refunded,
            _ => NotificationOutcome::Unknown,
        }
    }

    /// The record state this outcome drives toward, if any.
    ///
    /// A refund closes the record: no further classification changes are
    /// accepted for the attempt once the money has moved back.
    pub fn terminal_state(&self) -> Option<NotificationState> {
        match self {
            NotificationOutcome::Paid => Some(NotificationState::Completed),
            NotificationOutcome::Failed | NotificationOutcome::Refunded => {
                Some(NotificationState::Failed)
            }
            NotificationOutcome::Unknown => None,
        }
    }
}
