//! Inbound notification validation.
//!
//! Seal verification is the trust boundary: nothing past it questions the
//! payload again. The validator removes the seal field, verifies the rest,
//! then extracts and classifies the status. Cryptographic rejection never
//! falls through to status handling.

use secrecy::SecretString;

use crate::domain::sealing::{self, FieldSet, SEAL_FIELD};

use super::errors::NotificationError;
use super::field;
use super::outcome::NotificationOutcome;

/// Sentinel recorded when the gateway sends no masked card number.
pub const CARD_NOT_AVAILABLE: &str = "NaaN";

/// A notification whose seal has been verified.
///
/// Construction goes through [`validate`] only; holding one of these means
/// the payload is authentic.
#[derive(Debug, Clone)]
pub struct ValidatedNotification {
    pub outcome: NotificationOutcome,
    /// Raw status code as received, lowercased.
    pub status: String,
    /// Last four digits of the masked card, or [`CARD_NOT_AVAILABLE`].
    pub card_last4: String,
    /// Gateway refusal reason, when one was sent.
    pub refusal_reason: Option<String>,
    /// Full field set as received, seal included, kept for audit.
    pub raw: FieldSet,
}

/// Verify and classify an inbound notification.
///
/// # Errors
///
/// - `MissingSeal` if the seal field is absent.
/// - `InvalidSeal` if verification fails.
/// - `Key` if the merchant key itself is unusable.
pub fn validate(
    fields: &FieldSet,
    production_key: &SecretString,
) -> Result<ValidatedNotification, NotificationError> {
    let mut sealed_over = fields.clone();
    let presented = sealed_over
        .remove(SEAL_FIELD)
        .ok_or(NotificationError::MissingSeal)?;

    if !sealing::verify(&sealed_over, production_key, &presented)? {
        return Err(NotificationError::InvalidSeal);
    }

    let status = fields
        .get(field::CODE_RETOUR)
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    let card_last4 = fields
        .get(field::CBMASQUEE)
        .filter(|masked| !masked.is_empty())
        .map(|masked| {
            // Untrusted input, so slice on characters, not bytes.
            let chars: Vec<char> = masked.chars().collect();
            chars[chars.len().saturating_sub(4)..].iter().collect()
        })
        .unwrap_or_else(|| CARD_NOT_AVAILABLE.to_string());

    let refusal_reason = fields
        .get(field::MOTIF_REFUS)
        .filter(|reason| !reason.is_empty())
        .cloned();

    Ok(ValidatedNotification {
        outcome: NotificationOutcome::classify(&status),
        status,
        card_last4,
        refusal_reason,
        raw: fields.clone(),
    })
}
