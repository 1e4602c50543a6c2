//! Error types for notification handling and request building.
//!
//! `NotificationError` carries the HTTP status mapping for the webhook
//! boundary. The gateway retries delivery on any non-2xx response, so the
//! mapping decides which failures are retried (5xx, transient) and which
//! are terminal rejections (4xx).

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::domain::sealing::SealError;

/// Errors that occur while processing an inbound gateway notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The notification carries no seal field. Immediate rejection.
    #[error("missing seal")]
    MissingSeal,

    /// The seal did not verify. Security rejection; processing never falls
    /// through to status handling after this.
    #[error("invalid seal")]
    InvalidSeal,

    /// The opaque correlation field is absent from the payload.
    #[error("missing correlation field: {0}")]
    MissingCorrelation(&'static str),

    /// The opaque correlation field could not be decoded.
    #[error("malformed correlation payload: {0}")]
    MalformedCorrelation(String),

    /// No payment request matches the correlation hash. Unknown or forged
    /// notification; no state is created for it.
    #[error("no payment request matches the notification")]
    CorrelationNotFound,

    /// The configured merchant key is unusable. Operator-facing.
    #[error(transparent)]
    Key(#[from] SealError),

    /// Audit payload could not be serialized.
    #[error("failed to serialize notification payload: {0}")]
    Payload(String),

    /// Persistence failed; the gateway will retry delivery.
    #[error("storage error: {0}")]
    Storage(String),
}

impl NotificationError {
    /// True if the gateway should retry delivering this notification.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NotificationError::Storage(_))
    }

    /// HTTP status returned to the gateway for this failure.
    ///
    /// - 4xx: terminal rejection, the gateway gives up
    /// - 5xx: transient, the gateway retries
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Security rejections
            NotificationError::InvalidSeal => StatusCode::UNAUTHORIZED,

            // Malformed requests
            NotificationError::MissingSeal
            | NotificationError::MissingCorrelation(_)
            | NotificationError::MalformedCorrelation(_) => StatusCode::BAD_REQUEST,

            // Unknown correlation must never be acknowledged as handled
            NotificationError::CorrelationNotFound => StatusCode::NOT_FOUND,

            // Server-side failures, gateway retries
            NotificationError::Key(_)
            | NotificationError::Payload(_)
            | NotificationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for NotificationError {
    fn from(err: DomainError) -> Self {
        NotificationError::Storage(err.to_string())
    }
}

/// Precondition failures while assembling an outbound payment request.
///
/// These are fatal for the attempt: a request must never leave the builder
/// unsealed or partially sealed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("payment has no order")]
    MissingOrder,

    #[error("order has no billing address")]
    MissingBillingAddress,

    #[error("order has no customer")]
    MissingCustomer,

    #[error(transparent)]
    Seal(#[from] SealError),

    #[error("failed to encode request payload: {0}")]
    Payload(#[from] serde_json::Error),
}
