//! PostgreSQL implementation of StateTransitioner.
//!
//! Entity states live in `entity_states`, keyed by (entity_id, graph).
//! Legality is a fixed in-code table per graph; applying is a conditional
//! UPDATE on the expected source state, so a racing apply affects zero
//! rows and surfaces as `IllegalTransition`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::ports::{graphs, transitions, StateTransitioner};

pub struct PostgresStateTransitioner {
    pool: PgPool,
}

impl PostgresStateTransitioner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_state(&self, entity: Uuid, graph: &str) -> Result<Option<String>, DomainError> {
        let state: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT state FROM entity_states
            WHERE entity_id = $1 AND graph = $2
            "#,
        )
        .bind(entity)
        .bind(graph)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("failed to load entity state: {}", e)))?;

        Ok(state.map(|(s,)| s))
    }
}

/// (source state, target state) for a transition, or `None` if the graph
/// does not define it.
fn edge(graph: &str, transition: &str) -> Option<(&'static str, &'static str)> {
    match (graph, transition) {
        (graphs::ORDER_PAYMENT, transitions::PAY) => Some(("awaiting_payment", "paid")),
        (graphs::PAYMENT, transitions::COMPLETE) => Some(("new", "completed")),
        (graphs::PAYMENT, transitions::FAIL) => Some(("new", "failed")),
        (graphs::PAYMENT, transitions::REFUND) => Some(("completed", "refunded")),
        _ => None,
    }
}

#[async_trait]
impl StateTransitioner for PostgresStateTransitioner {
    async fn can_transition(
        &self,
        entity: Uuid,
        graph: &str,
        transition: &str,
    ) -> Result<bool, DomainError> {
        let Some((source, _)) = edge(graph, transition) else {
            return Ok(false);
        };

        Ok(self.current_state(entity, graph).await?.as_deref() == Some(source))
    }

    async fn apply_transition(
        &self,
        entity: Uuid,
        graph: &str,
        transition: &str,
    ) -> Result<(), DomainError> {
        let (source, target) = edge(graph, transition).ok_or_else(|| {
            DomainError::illegal_transition(format!(
                "graph {} has no transition {}",
                graph, transition
            ))
        })?;

        let result = sqlx::query(
            r#"
            UPDATE entity_states
            SET state = $3, updated_at = NOW()
            WHERE entity_id = $1 AND graph = $2 AND state = $4
            "#,
        )
        .bind(entity)
        .bind(graph)
        .bind(target)
        .bind(source)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("failed to apply transition: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::illegal_transition(format!(
                "{} not applicable for {} in graph {}",
                transition, entity, graph
            )));
        }
        Ok(())
    }
}
