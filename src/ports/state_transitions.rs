//! StateTransitioner port - order and payment state graphs.
//!
//! The wider system keeps order-level and payment-level state in named
//! transition graphs. The payment core only ever drives them through
//! check-then-apply: a transition is applied only after `can_transition`
//! confirmed it is legal, and an `IllegalTransition` from a race is
//! swallowed by the caller because replayed notifications make it routine.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::foundation::DomainError;

/// Graph names the notification path drives.
pub mod graphs {
    pub const ORDER_PAYMENT: &str = "order_payment";
    pub const PAYMENT: &str = "payment";
}

/// Transition names within those graphs.
pub mod transitions {
    pub const PAY: &str = "pay";
    pub const COMPLETE: &str = "complete";
    pub const FAIL: &str = "fail";
    pub const REFUND: &str = "refund";
}

/// Port over the external state-machine collaborator.
#[async_trait]
pub trait StateTransitioner: Send + Sync {
    /// Whether `transition` is currently legal for `entity` in `graph`.
    async fn can_transition(
        &self,
        entity: Uuid,
        graph: &str,
        transition: &str,
    ) -> Result<bool, DomainError>;

    /// Apply `transition`.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` if the transition is not legal at apply time,
    /// which can happen despite a prior check when deliveries race.
    async fn apply_transition(
        &self,
        entity: Uuid,
        graph: &str,
        transition: &str,
    ) -> Result<(), DomainError>;
}
