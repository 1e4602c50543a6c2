//! PaymentRequestRepository port - correlation lookup and idempotent claims.
//!
//! The gateway retries notification delivery on timeouts and non-2xx
//! responses, and two retries can land concurrently. The repository is the
//! serialization point for that hazard: `claim_terminal` performs a
//! conditional state update that succeeds for exactly one caller per
//! record, so every handler past it knows it owns the terminal transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::domain::payment::NotificationState;

/// A payment request as stored when the outbound form was built.
///
/// Located by the hash carried in the notification's correlation payload;
/// no other notification field is trusted for lookup.
#[derive(Debug, Clone)]
pub struct PaymentRequestRecord {
    pub hash: String,
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub state: NotificationState,
    pub created_at: DateTime<Utc>,
}

/// Response data observed from a verified notification, persisted for
/// audit before any state transition is applied.
#[derive(Debug, Clone)]
pub struct NotificationResponse {
    pub status: String,
    pub card_last4: String,
    pub refusal_reason: Option<String>,
    pub raw_payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

/// Result of attempting to claim the terminal transition for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// This caller moved the record out of `Pending` and owns the
    /// follow-on transitions.
    Applied,
    /// The record was already terminal. Duplicate or concurrent delivery.
    AlreadyTerminal,
}

/// Port for payment request persistence on the notification path.
///
/// Implementations must make `claim_terminal` atomic per record: a
/// conditional update guarded on the current state (or an equivalent
/// row-level lock), never a read-then-write in two round trips.
#[async_trait]
pub trait PaymentRequestRepository: Send + Sync {
    /// Find the record matching a correlation hash.
    ///
    /// Returns `None` for unknown hashes; the caller maps that to a
    /// rejection, never to new state.
    async fn find_by_hash(&self, hash: &str) -> Result<Option<PaymentRequestRecord>, DomainError>;

    /// Persist the observed notification response for audit.
    ///
    /// Called before the state transition, so a verified notification that
    /// crashes mid-processing can be reconciled from the stored response.
    async fn record_response(
        &self,
        hash: &str,
        response: &NotificationResponse,
    ) -> Result<(), DomainError>;

    /// Atomically move the record from `Pending` to the given terminal
    /// state. Exactly one concurrent caller gets `Applied`.
    async fn claim_terminal(
        &self,
        hash: &str,
        target: NotificationState,
    ) -> Result<ClaimResult, DomainError>;
}
