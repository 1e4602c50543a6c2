//! Monetico gateway configuration
//!
//! Holds the per-merchant credentials issued by the gateway: the virtual
//! terminal id (TPE), the company identifier and the production key used
//! for MAC sealing. The key is wrapped in [`SecretString`] so it is
//! redacted from any `Debug` output or log line.

use secrecy::SecretString;
use serde::Deserialize;

use crate::domain::payment::GatewayAccount;

use super::error::ValidationError;

/// Production payment endpoint.
pub const PAYMENT_URL: &str = "https://p.monetico-services.com/paiement.cgi";

/// Sandbox payment endpoint.
pub const PAYMENT_URL_SANDBOX: &str = "https://p.monetico-services.com/test/paiement.cgi";

/// Monetico gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Virtual terminal id assigned by the gateway (field `TPE`).
    pub tpe: String,

    /// Company identifier assigned by the gateway (field `societe`).
    pub company_id: String,

    /// Merchant production key, nominally 40 hex-like characters.
    /// Never logged; only exposed inside seal/verify computations.
    pub production_key: SecretString,

    /// Route payments to the production endpoint instead of the sandbox.
    #[serde(default)]
    pub use_production: bool,

    /// ISO currency code appended to the formatted amount.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl GatewayConfig {
    /// The payment endpoint selected by the production flag.
    pub fn payment_url(&self) -> &'static str {
        if self.use_production {
            PAYMENT_URL
        } else {
            PAYMENT_URL_SANDBOX
        }
    }

    /// The merchant account value object passed into domain operations.
    pub fn account(&self) -> GatewayAccount {
        GatewayAccount {
            tpe: self.tpe.clone(),
            company_id: self.company_id.clone(),
            production_key: self.production_key.clone(),
            currency: self.currency.clone(),
        }
    }

    /// Validate gateway configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        use secrecy::ExposeSecret;

        if self.tpe.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_TPE"));
        }
        if self.company_id.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_COMPANY_ID"));
        }
        if self.production_key.expose_secret().chars().count() < 40 {
            return Err(ValidationError::ProductionKeyTooShort);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

fn default_currency() -> String {
    "EUR".to_string()
}
