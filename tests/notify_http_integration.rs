//! End-to-end tests of the notification endpoint: raw form data in, the
//! gateway's fixed acknowledge/reject bodies out, with in-memory
//! collaborators behind the router.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use secrecy::SecretString;
use tower::ServiceExt;
use uuid::Uuid;

use monetico_gateway::adapters::http::{gateway_router, GatewayAppState};
use monetico_gateway::config::GatewayConfig;
use monetico_gateway::domain::foundation::DomainError;
use monetico_gateway::domain::payment::{CorrelationPayload, NotificationState};
use monetico_gateway::domain::sealing::{self, FieldSet, SEAL_FIELD};
use monetico_gateway::ports::{
    ClaimResult, NotificationResponse, PaymentRequestRecord, PaymentRequestRepository,
    StateTransitioner,
};

const TEST_KEY: &str = "0123456789ABCDEF0123456789ABCDEF012345X1";
const HASH: &str = "5e8f2a1c9b7d";

// ══════════════════════════════════════════════════════════════════════
// In-memory collaborators
// ══════════════════════════════════════════════════════════════════════

struct InMemoryRepository {
    known_hash: bool,
    state: Mutex<NotificationState>,
    responses: Mutex<Vec<NotificationResponse>>,
}

impl InMemoryRepository {
    fn with_pending_request() -> Self {
        Self {
            known_hash: true,
            state: Mutex::new(NotificationState::Pending),
            responses: Mutex::new(Vec::new()),
        }
    }

    fn empty() -> Self {
        Self {
            known_hash: false,
            state: Mutex::new(NotificationState::Pending),
            responses: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentRequestRepository for InMemoryRepository {
    async fn find_by_hash(&self, hash: &str) -> Result<Option<PaymentRequestRecord>, DomainError> {
        if !self.known_hash || hash != HASH {
            return Ok(None);
        }
        Ok(Some(PaymentRequestRecord {
            hash: HASH.to_string(),
            payment_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            state: *self.state.lock().unwrap(),
            created_at: Utc::now(),
        }))
    }

    async fn record_response(
        &self,
        _hash: &str,
        response: &NotificationResponse,
    ) -> Result<(), DomainError> {
        self.responses.lock().unwrap().push(response.clone());
        Ok(())
    }

    async fn claim_terminal(
        &self,
        _hash: &str,
        target: NotificationState,
    ) -> Result<ClaimResult, DomainError> {
        let mut state = self.state.lock().unwrap();
        if state.is_terminal() {
            Ok(ClaimResult::AlreadyTerminal)
        } else {
            *state = target;
            Ok(ClaimResult::Applied)
        }
    }
}

#[derive(Default)]
struct RecordingTransitioner {
    applied: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl StateTransitioner for RecordingTransitioner {
    async fn can_transition(
        &self,
        _entity: Uuid,
        _graph: &str,
        _transition: &str,
    ) -> Result<bool, DomainError> {
        Ok(true)
    }

    async fn apply_transition(
        &self,
        _entity: Uuid,
        graph: &str,
        transition: &str,
    ) -> Result<(), DomainError> {
        self.applied
            .lock()
            .unwrap()
            .push((graph.to_string(), transition.to_string()));
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════
// Fixtures
// ══════════════════════════════════════════════════════════════════════

fn app(
    repository: Arc<InMemoryRepository>,
    transitions: Arc<RecordingTransitioner>,
) -> Router {
    let state = GatewayAppState {
        payment_requests: repository,
        transitions,
        gateway: GatewayConfig {
            tpe: "1234567".to_string(),
            company_id: "acme".to_string(),
            production_key: SecretString::new(TEST_KEY.to_string()),
            use_production: false,
            currency: "EUR".to_string(),
        },
    };
    gateway_router().with_state(state)
}

fn sealed_notification(status: &str) -> HashMap<String, String> {
    let correlation = CorrelationPayload {
        payment_id: Uuid::new_v4(),
        order_id: Uuid::new_v4(),
        hash: HASH.to_string(),
    };
    let mut fields = FieldSet::try_from_pairs([
        ("TPE", "1234567".to_string()),
        ("date", "05/01/2026:12:01:07".to_string()),
        ("montant", "42.50EUR".to_string()),
        ("reference", "5E8F2A1C-42".to_string()),
        ("code-retour", status.to_string()),
        ("cbmasquee", "5555XXXXXXXX4444".to_string()),
        ("texte-libre", correlation.encode().unwrap()),
    ])
    .unwrap();
    let seal = sealing::seal(&fields, &SecretString::new(TEST_KEY.to_string())).unwrap();
    fields.insert(SEAL_FIELD, seal.as_str()).unwrap();

    fields
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn post_form(params: &HashMap<String, String>) -> Request<Body> {
    let body = serde_urlencoded::to_string(params).unwrap();
    Request::builder()
        .method("POST")
        .uri("/notify")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get_query(params: &HashMap<String, String>) -> Request<Body> {
    let query = serde_urlencoded::to_string(params).unwrap();
    Request::builder()
        .method("GET")
        .uri(format!("/notify?{}", query))
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ══════════════════════════════════════════════════════════════════════
// Acknowledgement protocol
// ══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn valid_post_notification_is_acknowledged() {
    let repo = Arc::new(InMemoryRepository::with_pending_request());
    let trans = Arc::new(RecordingTransitioner::default());
    let app = app(repo.clone(), trans.clone());

    let response = app.oneshot(post_form(&sealed_notification("payetest"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap(),
        "text/plain"
    );
    assert_eq!(body_text(response).await, "version=2\ncdr=0\n");
    assert_eq!(*repo.state.lock().unwrap(), NotificationState::Completed);
    assert_eq!(trans.applied.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn get_delivery_with_query_parameters_is_accepted() {
    let repo = Arc::new(InMemoryRepository::with_pending_request());
    let trans = Arc::new(RecordingTransitioner::default());
    let app = app(repo.clone(), trans);

    let response = app.oneshot(get_query(&sealed_notification("paiement"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "version=2\ncdr=0\n");
    assert_eq!(*repo.state.lock().unwrap(), NotificationState::Completed);
}

#[tokio::test]
async fn replayed_notification_is_acknowledged_with_one_transition() {
    let repo = Arc::new(InMemoryRepository::with_pending_request());
    let trans = Arc::new(RecordingTransitioner::default());
    let params = sealed_notification("payetest");

    let first = app(repo.clone(), trans.clone())
        .oneshot(post_form(&params))
        .await
        .unwrap();
    let second = app(repo.clone(), trans.clone())
        .oneshot(post_form(&params))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_text(second).await, "version=2\ncdr=0\n");
    // Both deliveries audited, exactly one set of transitions applied.
    assert_eq!(repo.responses.lock().unwrap().len(), 2);
    assert_eq!(trans.applied.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_status_is_acknowledged_without_transition() {
    let repo = Arc::new(InMemoryRepository::with_pending_request());
    let trans = Arc::new(RecordingTransitioner::default());
    let app = app(repo.clone(), trans.clone());

    let response = app.oneshot(post_form(&sealed_notification("xyz"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*repo.state.lock().unwrap(), NotificationState::Pending);
    assert!(trans.applied.lock().unwrap().is_empty());
}

// ══════════════════════════════════════════════════════════════════════
// Rejections
// ══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn tampered_notification_is_rejected_with_unauthorized() {
    let repo = Arc::new(InMemoryRepository::with_pending_request());
    let trans = Arc::new(RecordingTransitioner::default());
    let app = app(repo.clone(), trans.clone());

    let mut params = sealed_notification("annulation");
    params.insert("code-retour".to_string(), "paiement".to_string());

    let response = app.oneshot(post_form(&params)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "version=2\ncdr=1\n");
    assert_eq!(*repo.state.lock().unwrap(), NotificationState::Pending);
    assert!(trans.applied.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_seal_is_rejected_with_bad_request() {
    let repo = Arc::new(InMemoryRepository::with_pending_request());
    let trans = Arc::new(RecordingTransitioner::default());
    let app = app(repo, trans);

    let mut params = sealed_notification("payetest");
    params.remove("MAC");

    let response = app.oneshot(post_form(&params)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "version=2\ncdr=1\n");
}

#[tokio::test]
async fn unknown_correlation_hash_is_rejected_with_not_found() {
    let repo = Arc::new(InMemoryRepository::empty());
    let trans = Arc::new(RecordingTransitioner::default());
    let app = app(repo, trans);

    let response = app.oneshot(post_form(&sealed_notification("payetest"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "version=2\ncdr=1\n");
}

#[tokio::test]
async fn malformed_correlation_payload_is_rejected_with_bad_request() {
    let repo = Arc::new(InMemoryRepository::with_pending_request());
    let trans = Arc::new(RecordingTransitioner::default());
    let app = app(repo, trans);

    let mut params = sealed_notification("payetest");
    params.insert("texte-libre".to_string(), "not base64!!".to_string());

    let response = app.oneshot(post_form(&params)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "version=2\ncdr=1\n");
}

// ══════════════════════════════════════════════════════════════════════
// Capture endpoint
// ══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn capture_returns_sealed_form_fields() {
    let repo = Arc::new(InMemoryRepository::with_pending_request());
    let trans = Arc::new(RecordingTransitioner::default());
    let app = app(repo, trans);

    let payload = serde_json::json!({
        "payment_id": Uuid::new_v4(),
        "order_id": Uuid::new_v4(),
        "amount_minor": 4250,
        "billing_address": {
            "street": "12 rue de la Paix",
            "city": "Paris",
            "postcode": "75002",
            "country_code": "FR"
        },
        "customer": {
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com"
        },
        "success_url": "https://shop.example.com/after-pay",
        "error_url": "https://shop.example.com/after-pay",
        "request_hash": HASH
    });

    let request = Request::builder()
        .method("POST")
        .uri("/payments/capture")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["payment_url"].as_str().unwrap().contains("/test/"));
    assert_eq!(body["fields"]["montant"], "42.50EUR");
    assert!(body["fields"]["MAC"].as_str().unwrap().len() == 40);
}

#[tokio::test]
async fn capture_without_customer_is_unprocessable() {
    let repo = Arc::new(InMemoryRepository::with_pending_request());
    let trans = Arc::new(RecordingTransitioner::default());
    let app = app(repo, trans);

    let payload = serde_json::json!({
        "payment_id": Uuid::new_v4(),
        "order_id": Uuid::new_v4(),
        "amount_minor": 4250,
        "billing_address": {
            "street": "12 rue de la Paix",
            "city": "Paris",
            "postcode": "75002",
            "country_code": "FR"
        },
        "customer": null,
        "success_url": "https://shop.example.com/after-pay",
        "error_url": "https://shop.example.com/after-pay",
        "request_hash": HASH
    });

    let request = Request::builder()
        .method("POST")
        .uri("/payments/capture")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value =
        serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "MISSING_CUSTOMER");
}
