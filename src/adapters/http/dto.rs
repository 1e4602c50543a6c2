//! Request/response DTOs for the gateway HTTP API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment::{
    BillingAddress, Customer, OrderDetails, OutboundPaymentRequest, PaymentDetails,
};

#[derive(Debug, Clone, Deserialize)]
pub struct BillingAddressDto {
    pub street: String,
    pub city: String,
    pub postcode: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDto {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Request to build the sealed redirect form for one payment attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct CapturePaymentRequest {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    /// Amount in minor units of the configured currency.
    pub amount_minor: u64,
    pub billing_address: Option<BillingAddressDto>,
    pub customer: Option<CustomerDto>,
    pub success_url: String,
    pub error_url: String,
    pub request_hash: String,
}

impl CapturePaymentRequest {
    pub fn into_payment_details(self) -> PaymentDetails {
        PaymentDetails {
            payment_id: self.payment_id,
            amount_minor: self.amount_minor,
            order: Some(OrderDetails {
                order_id: self.order_id,
                billing_address: self.billing_address.map(|b| BillingAddress {
                    street: b.street,
                    city: b.city,
                    postcode: b.postcode,
                    country_code: b.country_code,
                }),
                customer: self.customer.map(|c| Customer {
                    first_name: c.first_name,
                    last_name: c.last_name,
                    email: c.email,
                }),
            }),
        }
    }
}

/// The sealed form: post `fields` to `payment_url`.
#[derive(Debug, Clone, Serialize)]
pub struct CapturePaymentResponse {
    pub payment_url: String,
    pub reference: String,
    pub fields: BTreeMap<String, String>,
}

impl CapturePaymentResponse {
    pub fn from_request(payment_url: String, request: OutboundPaymentRequest) -> Self {
        Self {
            payment_url,
            reference: request.reference.as_str().to_string(),
            fields: request
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
