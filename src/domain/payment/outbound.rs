//! Outbound payment request construction.
//!
//! Builds the exact field set posted to the gateway's payment endpoint,
//! seals it, and appends the seal under the reserved field. Everything is
//! a pure function of its inputs; gateway credentials arrive as an
//! explicit [`GatewayAccount`] value, never as ambient state.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::sealing::{self, FieldSet, SEAL_FIELD};

use super::correlation::CorrelationPayload;
use super::errors::BuildError;
use super::{field, LANGUAGE, PROTOCOL_VERSION};

/// Merchant credentials and currency for one gateway account.
#[derive(Clone)]
pub struct GatewayAccount {
    /// Terminal number issued by the gateway.
    pub tpe: String,
    /// Merchant company identifier.
    pub company_id: String,
    pub production_key: SecretString,
    /// ISO 4217 code appended to the formatted amount.
    pub currency: String,
}

impl std::fmt::Debug for GatewayAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayAccount")
            .field("tpe", &self.tpe)
            .field("company_id", &self.company_id)
            .field("production_key", &"[REDACTED]")
            .field("currency", &self.currency)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BillingAddress {
    pub street: String,
    pub city: String,
    pub postcode: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order_id: Uuid,
    pub billing_address: Option<BillingAddress>,
    pub customer: Option<Customer>,
}

/// What the upstream payment carries into the builder.
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub payment_id: Uuid,
    /// Amount in minor units of the account currency.
    pub amount_minor: u64,
    pub order: Option<OrderDetails>,
}

#[derive(Debug, Clone)]
pub struct ReturnUrls {
    pub success: String,
    pub error: String,
}

/// Gateway-visible per-attempt reference.
///
/// Must be unique among the merchant's attempts on the same processing day,
/// not globally unique. Always uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReference(String);

impl PaymentReference {
    /// Generate a fresh reference for one attempt: a random prefix joined
    /// to a fragment of the payment id.
    pub fn generate(payment_id: Uuid) -> Self {
        let nonce = Uuid::new_v4().simple().to_string();
        let payment = payment_id.simple().to_string();
        PaymentReference(format!("{}-{}", &nonce[..8], &payment[..8]).to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The sealed field set ready for posting to the gateway.
#[derive(Debug, Clone)]
pub struct OutboundPaymentRequest {
    pub reference: PaymentReference,
    /// Every protocol field, seal included.
    pub fields: FieldSet,
}

// Display/fraud-scoring block sent in `contexte_commande`. The gateway key
// names are fixed by the protocol; this block is never read back.
#[derive(Serialize)]
struct OrderContext<'a> {
    billing: BillingContext<'a>,
    client: ClientContext<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BillingContext<'a> {
    address_line1: &'a str,
    city: &'a str,
    postal_code: &'a str,
    country: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientContext<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
}

/// Format a minor-unit amount as the gateway expects: `amount/100` with
/// exactly two decimals and the literal currency code appended.
fn format_amount(amount_minor: u64, currency: &str) -> String {
    format!("{}.{:02}{}", amount_minor / 100, amount_minor % 100, currency)
}

/// Build and seal the outbound payment field set.
///
/// `issued_at` becomes the protocol `date` field; callers pass the current
/// time, tests pass a fixed one.
///
/// # Errors
///
/// `MissingOrder`, `MissingBillingAddress`, or `MissingCustomer` when the
/// payment lacks the corresponding data; `Seal` if the merchant key is
/// unusable. A request never leaves this function partially sealed.
pub fn build_payment_fields(
    payment: &PaymentDetails,
    account: &GatewayAccount,
    urls: &ReturnUrls,
    request_hash: &str,
    issued_at: DateTime<Utc>,
) -> Result<OutboundPaymentRequest, BuildError> {
    let order = payment.order.as_ref().ok_or(BuildError::MissingOrder)?;
    let billing = order
        .billing_address
        .as_ref()
        .ok_or(BuildError::MissingBillingAddress)?;
    let customer = order.customer.as_ref().ok_or(BuildError::MissingCustomer)?;

    let reference = PaymentReference::generate(payment.payment_id);

    let correlation = CorrelationPayload {
        payment_id: payment.payment_id,
        order_id: order.order_id,
        hash: request_hash.to_string(),
    };

    let context = OrderContext {
        billing: BillingContext {
            address_line1: &billing.street,
            city: &billing.city,
            postal_code: &billing.postcode,
            country: &billing.country_code,
        },
        client: ClientContext {
            first_name: &customer.first_name,
            last_name: &customer.last_name,
            email: &customer.email,
        },
    };

    let mut fields = FieldSet::try_from_pairs([
        (field::TPE, account.tpe.clone()),
        (field::SOCIETE, account.company_id.clone()),
        (
            field::MONTANT,
            format_amount(payment.amount_minor, &account.currency),
        ),
        (field::REFERENCE, reference.as_str().to_string()),
        (field::LGUE, LANGUAGE.to_string()),
        (field::VERSION, PROTOCOL_VERSION.to_string()),
        (
            field::DATE,
            issued_at.format("%d/%m/%Y:%H:%M:%S").to_string(),
        ),
        (field::TEXTE_LIBRE, correlation.encode()?),
        (
            field::CONTEXTE_COMMANDE,
            BASE64.encode(serde_json::to_vec(&context)?),
        ),
        (field::MAIL, customer.email.clone()),
        (field::URL_RETOUR_OK, urls.success.clone()),
        (field::URL_RETOUR_ERR, urls.error.clone()),
    ])?;

    let seal = sealing::seal(&fields, &account.production_key)?;
    fields.insert(SEAL_FIELD, seal.as_str())?;

    Ok(OutboundPaymentRequest { reference, fields })
}
