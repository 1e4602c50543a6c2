//! Axum router for the gateway endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{capture_payment, notify_payment, GatewayAppState};

/// Create the gateway router.
///
/// # Routes
///
/// - `GET|POST /notify` - gateway server-to-server notification (no auth,
///   seal verified)
/// - `POST /payments/capture` - build the sealed redirect form
pub fn gateway_router() -> Router<GatewayAppState> {
    Router::new()
        .route("/notify", get(notify_payment).post(notify_payment))
        .route("/payments/capture", post(capture_payment))
}
