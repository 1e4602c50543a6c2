//! Application layer - command handlers wiring the payment domain to its
//! collaborators.

pub mod handlers;
