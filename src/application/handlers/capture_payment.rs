//! CapturePaymentHandler - builds the sealed redirect form for a payment.

use chrono::Utc;
use tracing::info;

use crate::config::GatewayConfig;
use crate::domain::payment::{
    build_payment_fields, BuildError, OutboundPaymentRequest, PaymentDetails, ReturnUrls,
};

/// Command to start a gateway capture for one payment attempt.
#[derive(Debug, Clone)]
pub struct CapturePaymentCommand {
    pub payment: PaymentDetails,
    pub success_url: String,
    pub error_url: String,
    /// Hash of the stored payment request, echoed back by the gateway
    /// inside the correlation payload.
    pub request_hash: String,
}

/// Handler producing the sealed field set the payer's browser posts to the
/// gateway, together with the endpoint to post it to.
pub struct CapturePaymentHandler {
    gateway: GatewayConfig,
}

impl CapturePaymentHandler {
    pub fn new(gateway: GatewayConfig) -> Self {
        Self { gateway }
    }

    pub fn handle(
        &self,
        cmd: CapturePaymentCommand,
    ) -> Result<(String, OutboundPaymentRequest), BuildError> {
        let account = self.gateway.account();
        let urls = ReturnUrls {
            success: cmd.success_url,
            error: cmd.error_url,
        };

        let request =
            build_payment_fields(&cmd.payment, &account, &urls, &cmd.request_hash, Utc::now())?;

        info!(
            payment_id = %cmd.payment.payment_id,
            reference = %request.reference,
            "outbound payment request sealed"
        );

        Ok((self.gateway.payment_url().to_string(), request))
    }
}
