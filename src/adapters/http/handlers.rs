//! HTTP handlers for the gateway endpoints.
//!
//! The notification endpoint speaks the gateway's side-channel protocol:
//! whatever happens internally, the gateway only ever sees the fixed
//! acknowledge body on success or the fixed reject body with an error
//! status, so its retry logic is driven purely by transport-level failure.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, Json, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::application::handlers::{
    CapturePaymentCommand, CapturePaymentHandler, NotifyPaymentCommand, NotifyPaymentHandler,
};
use crate::config::GatewayConfig;
use crate::domain::payment::BuildError;
use crate::domain::sealing::FieldSet;
use crate::ports::{PaymentRequestRepository, StateTransitioner};

use super::dto::{CapturePaymentRequest, CapturePaymentResponse, ErrorResponse};

/// Fixed body the gateway requires to consider a notification delivered.
pub const NOTIFY_ACK_BODY: &str = "version=2\ncdr=0\n";

/// Fixed body sent with any notification rejection.
pub const NOTIFY_REJECT_BODY: &str = "version=2\ncdr=1\n";

/// Shared application state for the gateway routes.
#[derive(Clone)]
pub struct GatewayAppState {
    pub payment_requests: Arc<dyn PaymentRequestRepository>,
    pub transitions: Arc<dyn StateTransitioner>,
    pub gateway: GatewayConfig,
}

impl GatewayAppState {
    pub fn notify_handler(&self) -> NotifyPaymentHandler {
        NotifyPaymentHandler::new(
            self.payment_requests.clone(),
            self.transitions.clone(),
            self.gateway.production_key.clone(),
        )
    }

    pub fn capture_handler(&self) -> CapturePaymentHandler {
        CapturePaymentHandler::new(self.gateway.clone())
    }
}

/// Acknowledgement sent to the gateway for a handled notification.
struct NotifyAck;

impl IntoResponse for NotifyAck {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            NOTIFY_ACK_BODY,
        )
            .into_response()
    }
}

/// Rejection sent to the gateway; any non-2xx status makes it retry.
struct NotifyReject(StatusCode);

impl IntoResponse for NotifyReject {
    fn into_response(self) -> Response {
        (
            self.0,
            [(header::CONTENT_TYPE, "text/plain")],
            NOTIFY_REJECT_BODY,
        )
            .into_response()
    }
}

/// Gateway notification endpoint. The gateway sends POST form data but is
/// documented to fall back to GET with query parameters; `Form` reads the
/// query on GET, so one handler serves both.
pub async fn notify_payment(
    State(state): State<GatewayAppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let fields = match FieldSet::try_from_pairs(params) {
        Ok(fields) => fields,
        Err(_) => return NotifyReject(StatusCode::BAD_REQUEST).into_response(),
    };

    match state
        .notify_handler()
        .handle(NotifyPaymentCommand { fields })
        .await
    {
        // Unknown statuses and replays are still delivered successfully
        // from the gateway's point of view.
        Ok(_) => NotifyAck.into_response(),
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                error!(error = %err, "notification processing failed");
            }
            NotifyReject(status).into_response()
        }
    }
}

/// Build the sealed payment form for a payment attempt.
pub async fn capture_payment(
    State(state): State<GatewayAppState>,
    Json(request): Json<CapturePaymentRequest>,
) -> Response {
    let cmd = CapturePaymentCommand {
        success_url: request.success_url.clone(),
        error_url: request.error_url.clone(),
        request_hash: request.request_hash.clone(),
        payment: request.into_payment_details(),
    };

    match state.capture_handler().handle(cmd) {
        Ok((payment_url, outbound)) => (
            StatusCode::OK,
            Json(CapturePaymentResponse::from_request(payment_url, outbound)),
        )
            .into_response(),
        Err(err) => build_error_response(err),
    }
}

fn build_error_response(err: BuildError) -> Response {
    let (status, code) = match &err {
        BuildError::MissingOrder => (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_ORDER"),
        BuildError::MissingBillingAddress => {
            (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_BILLING_ADDRESS")
        }
        BuildError::MissingCustomer => (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_CUSTOMER"),
        BuildError::Seal(_) | BuildError::Payload(_) => {
            error!(error = %err, "failed to build outbound payment request");
            (StatusCode::INTERNAL_SERVER_ERROR, "REQUEST_BUILD_FAILED")
        }
    };
    (status, Json(ErrorResponse::new(code, err.to_string()))).into_response()
}
