//! Idempotent payment-outcome processing.
//!
//! Exactly one terminal transition per payment request, no matter how many
//! times the gateway delivers the notification or how those deliveries
//! interleave. The record's own state is checked first; the repository's
//! atomic claim is the serialization point for concurrent deliveries; the
//! order/payment graphs are driven check-then-apply with races swallowed.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::foundation::DomainError;
use crate::ports::{
    graphs, transitions, ClaimResult, NotificationResponse, PaymentRequestRecord,
    PaymentRequestRepository, StateTransitioner,
};

use super::errors::NotificationError;
use super::notification::ValidatedNotification;
use super::outcome::NotificationOutcome;

/// What processing did for this delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// Payment confirmed; order and payment marked paid.
    Completed,
    /// Payment refused or cancelled.
    Failed,
    /// Payment refunded.
    Refunded,
    /// Unrecognized status; recorded, no transition, record stays pending.
    NoTransition,
    /// The record was already terminal. Replay or lost race, both fine.
    AlreadyProcessed,
}

pub struct PaymentOutcomeProcessor {
    repository: Arc<dyn PaymentRequestRepository>,
    transitions: Arc<dyn StateTransitioner>,
}

impl PaymentOutcomeProcessor {
    pub fn new(
        repository: Arc<dyn PaymentRequestRepository>,
        transitions: Arc<dyn StateTransitioner>,
    ) -> Self {
        Self {
            repository,
            transitions,
        }
    }

    /// Apply a verified notification to its payment request.
    ///
    /// The response data is persisted first, so a delivery that verifies
    /// and then crashes can be reconciled from the audit trail. Only the
    /// caller that wins the repository claim drives the state graphs.
    pub async fn process(
        &self,
        record: &PaymentRequestRecord,
        notification: &ValidatedNotification,
    ) -> Result<ProcessResult, NotificationError> {
        let response = NotificationResponse {
            status: notification.status.clone(),
            card_last4: notification.card_last4.clone(),
            refusal_reason: notification.refusal_reason.clone(),
            raw_payload: serde_json::to_value(&notification.raw)
                .map_err(|e| NotificationError::Payload(e.to_string()))?,
            received_at: Utc::now(),
        };
        self.repository
            .record_response(&record.hash, &response)
            .await?;

        if record.state.is_terminal() {
            debug!(
                hash = %record.hash,
                state = record.state.as_str(),
                "duplicate notification for terminal record"
            );
            return Ok(ProcessResult::AlreadyProcessed);
        }

        let Some(target) = notification.outcome.terminal_state() else {
            info!(
                hash = %record.hash,
                status = %notification.status,
                "unrecognized gateway status, leaving record pending"
            );
            return Ok(ProcessResult::NoTransition);
        };

        match self.repository.claim_terminal(&record.hash, target).await? {
            ClaimResult::Applied => {}
            ClaimResult::AlreadyTerminal => {
                debug!(hash = %record.hash, "lost claim race, notification already handled");
                return Ok(ProcessResult::AlreadyProcessed);
            }
        }

        let result = match notification.outcome {
            NotificationOutcome::Paid => {
                self.apply_if_legal(record.order_id, graphs::ORDER_PAYMENT, transitions::PAY)
                    .await?;
                self.apply_if_legal(record.payment_id, graphs::PAYMENT, transitions::COMPLETE)
                    .await?;
                ProcessResult::Completed
            }
            NotificationOutcome::Failed => {
                self.apply_if_legal(record.payment_id, graphs::PAYMENT, transitions::FAIL)
                    .await?;
                ProcessResult::Failed
            }
            NotificationOutcome::Refunded => {
                self.apply_if_legal(record.payment_id, graphs::PAYMENT, transitions::REFUND)
                    .await?;
                ProcessResult::Refunded
            }
            // terminal_state() returned Some above
            NotificationOutcome::Unknown => ProcessResult::NoTransition,
        };

        info!(
            hash = %record.hash,
            status = %notification.status,
            result = ?result,
            "payment notification processed"
        );
        Ok(result)
    }

    /// Check-then-apply one graph transition. An illegal transition at
    /// either step is expected under replay and is not an error.
    async fn apply_if_legal(
        &self,
        entity: uuid::Uuid,
        graph: &str,
        transition: &str,
    ) -> Result<(), NotificationError> {
        if !self
            .transitions
            .can_transition(entity, graph, transition)
            .await?
        {
            debug!(%entity, graph, transition, "transition not currently legal, skipping");
            return Ok(());
        }

        match self
            .transitions
            .apply_transition(entity, graph, transition)
            .await
        {
            Ok(()) => Ok(()),
            // Lost a race between check and apply.
            Err(DomainError::IllegalTransition(reason)) => {
                warn!(%entity, graph, transition, %reason, "transition became illegal, skipping");
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }
}
