//! Command handlers.

mod capture_payment;
mod notify_payment;

pub use capture_payment::{CapturePaymentCommand, CapturePaymentHandler};
pub use notify_payment::{NotifyPaymentCommand, NotifyPaymentHandler};
