//! Withdrawal Engine
//!
//! Debits a single account and records the withdrawal.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{plan_withdrawal, Amount, Balance, WithdrawalRecord};
use crate::ledger::LedgerStore;

use super::EngineError;

/// Result of a committed withdrawal
#[derive(Debug, Clone)]
pub struct WithdrawalOutcome {
    pub record: WithdrawalRecord,
    pub balance: Balance,
}

#[derive(Debug, Clone)]
pub struct WithdrawalEngine {
    pool: PgPool,
    ledger: LedgerStore,
}

impl WithdrawalEngine {
    pub fn new(pool: PgPool) -> Self {
        Self {
            ledger: LedgerStore::new(pool.clone()),
            pool,
        }
    }

    /// Debit `amount` from the account as one atomic unit of work
    pub async fn execute(
        &self,
        account_id: Uuid,
        amount: Amount,
    ) -> Result<WithdrawalOutcome, EngineError> {
        let mut tx = self.pool.begin().await?;

        let before = self.ledger.lock(&mut tx, account_id).await?;
        let after = match plan_withdrawal(before, amount) {
            Ok(after) => after,
            Err(e) => {
                tracing::info!(
                    account = %account_id,
                    amount = amount.value(),
                    available = before.value(),
                    error = %e,
                    "Withdrawal rejected"
                );
                return Err(e.into());
            }
        };

        let record: (Uuid, Uuid, i64, chrono::DateTime<chrono::Utc>) = sqlx::query_as(
            r#"
            INSERT INTO withdrawals (user_id, amount)
            VALUES ($1, $2)
            RETURNING id, user_id, amount, created_at
            "#,
        )
        .bind(account_id)
        .bind(amount.value())
        .fetch_one(&mut *tx)
        .await?;

        self.ledger.set_balance(&mut tx, account_id, after).await?;

        tx.commit().await?;

        let (id, account_id, amount, created_at) = record;
        tracing::info!(withdrawal_id = %id, account = %account_id, amount, "Withdrawal committed");

        Ok(WithdrawalOutcome {
            record: WithdrawalRecord {
                id,
                account_id,
                amount,
                created_at,
            },
            balance: after,
        })
    }
}
