//! Transfer Engine
//!
//! Moves balance between two accounts and records both sides.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Amount, Balance, Direction, DomainError, TransferPlan, TransferRecord};
use crate::ledger::LedgerStore;

use super::EngineError;

/// Result of a committed transfer
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub outgoing: TransferRecord,
    pub incoming: TransferRecord,
    pub sender_balance: Balance,
    pub recipient_balance: Balance,
}

#[derive(Debug, Clone)]
pub struct TransferEngine {
    pool: PgPool,
    ledger: LedgerStore,
}

impl TransferEngine {
    pub fn new(pool: PgPool) -> Self {
        Self {
            ledger: LedgerStore::new(pool.clone()),
            pool,
        }
    }

    /// Execute a transfer as one atomic unit of work.
    ///
    /// Balances are read under `FOR UPDATE` locks inside the transaction, so
    /// concurrent transfers touching the same account serialize on its row.
    pub async fn execute(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        amount: Amount,
    ) -> Result<TransferOutcome, EngineError> {
        if sender_id == recipient_id {
            return Err(DomainError::SameAccountTransfer.into());
        }

        let mut tx = self.pool.begin().await?;

        let (sender_before, recipient_before) =
            self.ledger.lock_pair(&mut tx, sender_id, recipient_id).await?;

        let plan = match TransferPlan::compute(sender_before, recipient_before, amount) {
            Ok(plan) => plan,
            Err(e) => {
                // dropping `tx` rolls back
                tracing::info!(
                    sender = %sender_id,
                    recipient = %recipient_id,
                    amount = amount.value(),
                    available = sender_before.value(),
                    error = %e,
                    "Transfer rejected"
                );
                return Err(e.into());
            }
        };

        let now = Utc::now();

        let outgoing_id =
            insert_record(&mut tx, sender_id, recipient_id, amount, Direction::Outgoing, None, now)
                .await?;
        self.ledger
            .set_balance(&mut tx, recipient_id, plan.recipient_after)
            .await?;
        self.ledger
            .set_balance(&mut tx, sender_id, plan.sender_after)
            .await?;
        let incoming_id = insert_record(
            &mut tx,
            sender_id,
            recipient_id,
            amount,
            Direction::Incoming,
            Some(outgoing_id),
            now,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            transfer_id = %outgoing_id,
            sender = %sender_id,
            recipient = %recipient_id,
            amount = amount.value(),
            "Transfer committed"
        );

        let record = |id, direction, link_id| TransferRecord {
            id,
            sender_id,
            sender_name: None,
            recipient_id,
            recipient_name: None,
            amount: amount.value(),
            direction,
            link_id,
            created_at: now,
        };

        Ok(TransferOutcome {
            outgoing: record(outgoing_id, Direction::Outgoing, None),
            incoming: record(incoming_id, Direction::Incoming, Some(outgoing_id)),
            sender_balance: plan.sender_after,
            recipient_balance: plan.recipient_after,
        })
    }
}

async fn insert_record(
    tx: &mut Transaction<'_, Postgres>,
    sender_id: Uuid,
    recipient_id: Uuid,
    amount: Amount,
    direction: Direction,
    link_id: Option<Uuid>,
    created_at: DateTime<Utc>,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO transfer_records (sender_id, recipient_id, amount, direction, link_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(sender_id)
    .bind(recipient_id)
    .bind(amount.value())
    .bind(direction.as_str())
    .bind(link_id)
    .bind(created_at)
    .fetch_one(&mut **tx)
    .await
}
