//! HTTP adapter - axum routes and handlers for the gateway endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{CapturePaymentRequest, CapturePaymentResponse, ErrorResponse};
pub use handlers::GatewayAppState;
pub use routes::gateway_router;
