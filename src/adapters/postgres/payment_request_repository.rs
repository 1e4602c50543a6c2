//! PostgreSQL implementation of PaymentRequestRepository.
//!
//! The claim is a single conditional UPDATE guarded on the current state,
//! so concurrent deliveries for the same record serialize on the row and
//! exactly one caller observes an affected row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::domain::payment::NotificationState;
use crate::ports::{
    ClaimResult, NotificationResponse, PaymentRequestRecord, PaymentRequestRepository,
};

pub struct PostgresPaymentRequestRepository {
    pool: PgPool,
}

impl PostgresPaymentRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRequestRow {
    hash: String,
    payment_id: Uuid,
    order_id: Uuid,
    state: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRequestRow> for PaymentRequestRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRequestRow) -> Result<Self, Self::Error> {
        let state = NotificationState::parse(&row.state).ok_or_else(|| {
            DomainError::storage(format!("invalid payment request state: {}", row.state))
        })?;

        Ok(PaymentRequestRecord {
            hash: row.hash,
            payment_id: row.payment_id,
            order_id: row.order_id,
            state,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl PaymentRequestRepository for PostgresPaymentRequestRepository {
    async fn find_by_hash(&self, hash: &str) -> Result<Option<PaymentRequestRecord>, DomainError> {
        let row: Option<PaymentRequestRow> = sqlx::query_as(
            r#"
            SELECT hash, payment_id, order_id, state, created_at
            FROM payment_requests
            WHERE hash = $1
            "#,
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("failed to load payment request: {}", e)))?;

        row.map(PaymentRequestRecord::try_from).transpose()
    }

    async fn record_response(
        &self,
        hash: &str,
        response: &NotificationResponse,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_requests SET
                response_status = $2,
                response_card_last4 = $3,
                response_refusal_reason = $4,
                response_payload = $5,
                response_received_at = $6
            WHERE hash = $1
            "#,
        )
        .bind(hash)
        .bind(&response.status)
        .bind(&response.card_last4)
        .bind(&response.refusal_reason)
        .bind(&response.raw_payload)
        .bind(response.received_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("failed to record response: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("payment_request"));
        }
        Ok(())
    }

    async fn claim_terminal(
        &self,
        hash: &str,
        target: NotificationState,
    ) -> Result<ClaimResult, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_requests
            SET state = $2, updated_at = NOW()
            WHERE hash = $1 AND state = 'pending'
            "#,
        )
        .bind(hash)
        .bind(target.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("failed to claim terminal state: {}", e)))?;

        if result.rows_affected() == 1 {
            Ok(ClaimResult::Applied)
        } else {
            Ok(ClaimResult::AlreadyTerminal)
        }
    }
}
