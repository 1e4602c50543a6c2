//! Payment - outbound request construction and notification processing.

mod correlation;
mod errors;
mod notification;
mod outbound;
mod outcome;
mod processor;
mod state;

pub use correlation::CorrelationPayload;
pub use errors::{BuildError, NotificationError};
pub use notification::{validate, ValidatedNotification, CARD_NOT_AVAILABLE};
pub use outbound::{
    build_payment_fields, BillingAddress, Customer, GatewayAccount, OrderDetails,
    OutboundPaymentRequest, PaymentDetails, PaymentReference, ReturnUrls,
};
pub use outcome::NotificationOutcome;
pub use processor::{PaymentOutcomeProcessor, ProcessResult};
pub use state::NotificationState;

/// Gateway protocol field names.
///
/// The outbound names belong to the gateway's payment form; the inbound
/// ones to the server-to-server notification. The seal field itself lives
/// in [`crate::domain::sealing::SEAL_FIELD`].
pub mod field {
    pub const TPE: &str = "TPE";
    pub const SOCIETE: &str = "societe";
    pub const MONTANT: &str = "montant";
    pub const REFERENCE: &str = "reference";
    pub const LGUE: &str = "lgue";
    pub const VERSION: &str = "version";
    pub const DATE: &str = "date";
    pub const TEXTE_LIBRE: &str = "texte-libre";
    pub const CONTEXTE_COMMANDE: &str = "contexte_commande";
    pub const MAIL: &str = "mail";
    pub const URL_RETOUR_OK: &str = "url_retour_ok";
    pub const URL_RETOUR_ERR: &str = "url_retour_err";

    pub const CODE_RETOUR: &str = "code-retour";
    pub const CBMASQUEE: &str = "cbmasquee";
    pub const MOTIF_REFUS: &str = "motifrefus";
}

/// Protocol version sent in the `version` field.
pub const PROTOCOL_VERSION: &str = "3.0";

/// Interface language sent in the `lgue` field.
pub const LANGUAGE: &str = "FR";
