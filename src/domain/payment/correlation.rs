//! Opaque correlation payload carried in the `texte-libre` field.
//!
//! The payload is the only thing the notification path trusts to locate
//! the originating payment request: a base64-encoded JSON object carrying
//! the payment id, order id, and the request hash used for lookup. It
//! travels out with the payment form and comes back verbatim in the
//! notification, covered by the seal in both directions.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::NotificationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationPayload {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub hash: String,
}

impl CorrelationPayload {
    /// Encode for the outbound `texte-libre` field.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        Ok(BASE64.encode(serde_json::to_vec(self)?))
    }

    /// Decode the field as it came back in a notification.
    ///
    /// # Errors
    ///
    /// `MalformedCorrelation` for anything that is not base64-wrapped JSON
    /// of the expected shape.
    pub fn decode(raw: &str) -> Result<Self, NotificationError> {
        let bytes = BASE64
            .decode(raw.trim())
            .map_err(|e| NotificationError::MalformedCorrelation(format!("invalid base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| NotificationError::MalformedCorrelation(format!("invalid json: {e}")))
    }
}
