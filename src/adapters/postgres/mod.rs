//! PostgreSQL implementations of the persistence ports.

mod payment_request_repository;
mod state_transitions;

pub use payment_request_repository::PostgresPaymentRequestRepository;
pub use state_transitions::PostgresStateTransitioner;
