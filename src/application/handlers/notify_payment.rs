//! NotifyPaymentHandler - processes a gateway notification end to end.
//!
//! Correlation lookup runs before seal verification, mirroring the way the
//! merchant key is resolved from the matched request's account; an unknown
//! hash is rejected without doing any cryptography. Everything past a
//! verified seal is trusted.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};

use crate::domain::payment::{
    self, CorrelationPayload, NotificationError, PaymentOutcomeProcessor, ProcessResult,
};
use crate::domain::sealing::FieldSet;
use crate::ports::{PaymentRequestRepository, StateTransitioner};

/// Command carrying the raw notification fields, exactly as received from
/// form or query parameters.
#[derive(Debug, Clone)]
pub struct NotifyPaymentCommand {
    pub fields: FieldSet,
}

pub struct NotifyPaymentHandler {
    repository: Arc<dyn PaymentRequestRepository>,
    processor: PaymentOutcomeProcessor,
    production_key: SecretString,
}

impl NotifyPaymentHandler {
    pub fn new(
        repository: Arc<dyn PaymentRequestRepository>,
        transitions: Arc<dyn StateTransitioner>,
        production_key: SecretString,
    ) -> Self {
        let processor = PaymentOutcomeProcessor::new(repository.clone(), transitions);
        Self {
            repository,
            processor,
            production_key,
        }
    }

    pub async fn handle(
        &self,
        cmd: NotifyPaymentCommand,
    ) -> Result<ProcessResult, NotificationError> {
        let correlation = self.extract_correlation(&cmd.fields)?;

        let record = self
            .repository
            .find_by_hash(&correlation.hash)
            .await?
            .ok_or_else(|| {
                warn!(hash = %correlation.hash, "notification for unknown payment request");
                NotificationError::CorrelationNotFound
            })?;

        let validated = payment::validate(&cmd.fields, &self.production_key).map_err(|err| {
            warn!(hash = %correlation.hash, error = %err, "notification rejected");
            err
        })?;

        info!(
            hash = %correlation.hash,
            status = %validated.status,
            outcome = ?validated.outcome,
            "notification verified"
        );

        self.processor.process(&record, &validated).await
    }

    fn extract_correlation(
        &self,
        fields: &FieldSet,
    ) -> Result<CorrelationPayload, NotificationError> {
        let raw = fields
            .get(payment::field::TEXTE_LIBRE)
            .ok_or(NotificationError::MissingCorrelation(
                payment::field::TEXTE_LIBRE,
            ))?;
        CorrelationPayload::decode(raw)
    }
}
