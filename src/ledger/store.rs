//! Balance table access.
//!
//! Every mutating operation takes a caller-owned transaction so the balance
//! write commits or rolls back together with the ledger record inserts.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::auth::password;
use crate::domain::{Amount, AmountError, Balance};

/// Balance rows keyed by account id
#[derive(Debug, Clone)]
pub struct LedgerStore {
    pool: PgPool,
}

impl LedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the zero balance row for a new account
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        pin: &str,
    ) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO balances (user_id, balance, pin_hash)
            VALUES ($1, 0, $2)
            "#,
        )
        .bind(account_id)
        .bind(password::hash_secret(pin))
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Lock one balance row for the rest of the transaction and read it
    pub async fn lock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
    ) -> Result<Balance, LedgerError> {
        let balance: Option<i64> = sqlx::query_scalar(
            "SELECT balance FROM balances WHERE user_id = $1 FOR UPDATE",
        )
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .await?;

        let balance = balance.ok_or(LedgerError::BalanceNotFound(account_id))?;
        Ok(Balance::new(balance)?)
    }

    /// Lock two balance rows in ascending id order and return them in
    /// argument order. A fixed lock order keeps opposing transfers between
    /// the same pair from deadlocking.
    pub async fn lock_pair(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        first: Uuid,
        second: Uuid,
    ) -> Result<(Balance, Balance), LedgerError> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT user_id, balance
            FROM balances
            WHERE user_id = ANY($1)
            ORDER BY user_id
            FOR UPDATE
            "#,
        )
        .bind(vec![first, second])
        .fetch_all(&mut **tx)
        .await?;

        let find = |id: Uuid| -> Result<Balance, LedgerError> {
            let (_, value) = rows
                .iter()
                .find(|(row_id, _)| *row_id == id)
                .ok_or(LedgerError::BalanceNotFound(id))?;
            Ok(Balance::new(*value)?)
        };

        Ok((find(first)?, find(second)?))
    }

    /// Overwrite a locked balance row
    pub async fn set_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        balance: Balance,
    ) -> Result<(), LedgerError> {
        let rows = sqlx::query(
            "UPDATE balances SET balance = $1, updated_at = NOW() WHERE user_id = $2",
        )
        .bind(balance.value())
        .bind(account_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(LedgerError::BalanceNotFound(account_id));
        }
        Ok(())
    }

    /// Lock the row and add `amount` to it, returning the new balance
    pub async fn credit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        amount: &Amount,
    ) -> Result<Balance, LedgerError> {
        let balance = self.lock(tx, account_id).await?.credit(amount)?;
        self.set_balance(tx, account_id, balance).await?;
        Ok(balance)
    }

    /// Current balance for display; not locked
    pub async fn balance_of(&self, account_id: Uuid) -> Result<Option<Balance>, LedgerError> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM balances WHERE user_id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await?;

        balance.map(Balance::new).transpose().map_err(Into::into)
    }

    /// Check a PIN against the stored hash
    pub async fn verify_pin(&self, account_id: Uuid, pin: &str) -> Result<bool, LedgerError> {
        let pin_hash: Option<String> =
            sqlx::query_scalar("SELECT pin_hash FROM balances WHERE user_id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await?;

        let pin_hash = pin_hash.ok_or(LedgerError::BalanceNotFound(account_id))?;
        Ok(password::verify_secret(pin, &pin_hash))
    }

    /// Replace the stored PIN
    pub async fn update_pin(&self, account_id: Uuid, new_pin: &str) -> Result<(), LedgerError> {
        let rows = sqlx::query(
            "UPDATE balances SET pin_hash = $1, updated_at = NOW() WHERE user_id = $2",
        )
        .bind(password::hash_secret(new_pin))
        .bind(account_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(LedgerError::BalanceNotFound(account_id));
        }
        Ok(())
    }
}

/// Ledger store errors
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Balance row not found for account {0}")]
    BalanceNotFound(Uuid),

    #[error("Stored balance violates invariant: {0}")]
    Corrupt(#[from] AmountError),
}
