//! Ports - interfaces between the payment core and its collaborators.
//!
//! The core never touches persistence directly: the notification path talks
//! to [`PaymentRequestRepository`] for correlation lookup and audit, and to
//! [`StateTransitioner`] for order/payment state graphs. Adapters implement
//! these against Postgres; tests implement them in memory.

mod payment_request_repository;
mod state_transitions;

pub use payment_request_repository::{
    ClaimResult, NotificationResponse, PaymentRequestRecord, PaymentRequestRepository,
};
pub use state_transitions::{graphs, transitions, StateTransitioner};
