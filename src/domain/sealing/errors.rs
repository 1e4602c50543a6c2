//! Seal computation error types.
//!
//! These are configuration or programming errors, surfaced to the operator
//! and never to the payer. Messages must never include key material.

use thiserror::Error;

/// Errors that occur while computing or verifying a seal.
#[derive(Debug, Clone, Error)]
pub enum SealError {
    /// The merchant production key is malformed. Fatal configuration error.
    #[error("invalid merchant key format: {0}")]
    InvalidKeyFormat(&'static str),

    /// A field set handed to `seal` already carries the reserved seal field.
    #[error("field set already contains the reserved seal field")]
    SealFieldPresent,

    /// A field name was empty, which the canonical format cannot represent.
    #[error("field names must not be empty")]
    EmptyFieldName,
}
