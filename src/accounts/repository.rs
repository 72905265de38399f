//! Account Repository
//!
//! Reads and writes the `users` and `payout_destinations` tables. The
//! engines never touch these rows; handlers use this repository to enforce
//! the existence and verification preconditions before invoking them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::auth::Role;
use crate::domain::{DomainError, Party, VerificationStatus};
use crate::error::{is_unique_violation, AppError, AppResult};

type AccountRow = (Uuid, String, String, String, String, String, String, DateTime<Utc>, DateTime<Utc>);

const ACCOUNT_COLUMNS: &str = "id, name, username, email, phone_number, role, verification_status, created_at, updated_at";

/// Account as exposed to handlers (no credentials)
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    fn from_row(row: AccountRow) -> AppResult<Self> {
        let (id, name, username, email, phone_number, role, status, created_at, updated_at) = row;
        Ok(Self {
            id,
            name,
            username,
            email,
            phone_number,
            role: Role::parse(&role)
                .ok_or_else(|| AppError::Internal(format!("unknown role '{}' for {}", role, id)))?,
            verification_status: VerificationStatus::parse(&status).ok_or_else(|| {
                AppError::Internal(format!("unknown verification status '{}' for {}", status, id))
            })?,
            created_at,
            updated_at,
        })
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status.is_verified()
    }
}

/// Fields for a new account row
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial profile update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone_number.is_none()
    }
}

/// Registered withdrawal destination (bank account)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutDestination {
    pub account_id: Uuid,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up an account by id
    pub async fn find(&self, account_id: Uuid) -> AppResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::from_row).transpose()
    }

    /// Look up an account, failing with `AccountNotFound`
    pub async fn get(&self, account_id: Uuid) -> AppResult<Account> {
        self.find(account_id)
            .await?
            .ok_or_else(|| DomainError::AccountNotFound(account_id.to_string()).into())
    }

    /// Look up an account that must exist and be verified.
    ///
    /// Not-found and not-verified are reported separately so callers can
    /// tell the user which step is missing.
    pub async fn get_verified(&self, account_id: Uuid, party: Party) -> AppResult<Account> {
        let account = self.get(account_id).await?;
        if !account.is_verified() {
            return Err(DomainError::not_verified(party).into());
        }
        Ok(account)
    }

    /// Account plus password hash for login
    pub async fn find_credentials(&self, username: &str) -> AppResult<Option<(Account, String)>> {
        let row: Option<(Uuid, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        let Some((id, password_hash)) = row else {
            return Ok(None);
        };
        Ok(self.find(id).await?.map(|account| (account, password_hash)))
    }

    /// Insert a new account row inside the caller's transaction
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new: NewAccount,
    ) -> AppResult<Account> {
        let row: AccountRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (name, username, email, phone_number, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(&new.name)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.phone_number)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("username or email already registered".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Account::from_row(row)
    }

    /// Apply a partial profile update
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        changes: ProfileChanges,
    ) -> AppResult<Account> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone_number = COALESCE($4, phone_number),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("email already registered".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        let row = row.ok_or_else(|| DomainError::AccountNotFound(account_id.to_string()))?;
        Account::from_row(row)
    }

    /// Submit a verification document; the account waits for admin approval
    pub async fn submit_verification(&self, account_id: Uuid, document: &str) -> AppResult<Account> {
        let account = self.get(account_id).await?;
        if account.is_verified() {
            return Err(DomainError::BusinessRuleViolation(
                "account is already verified".to_string(),
            )
            .into());
        }

        sqlx::query(
            r#"
            UPDATE users
            SET verification_status = 'pending', verification_document = $2, updated_at = NOW()
            WHERE id = $1 AND verification_status <> 'verified'
            "#,
        )
        .bind(account_id)
        .bind(document)
        .execute(&self.pool)
        .await?;

        self.get(account_id).await
    }

    /// Approve a pending verification
    pub async fn approve_verification(&self, account_id: Uuid) -> AppResult<Account> {
        let rows = sqlx::query(
            r#"
            UPDATE users
            SET verification_status = 'verified', updated_at = NOW()
            WHERE id = $1 AND verification_status = 'pending'
            "#,
        )
        .bind(account_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            // Distinguish unknown account from wrong state
            self.get(account_id).await?;
            return Err(DomainError::BusinessRuleViolation(
                "account has no pending verification".to_string(),
            )
            .into());
        }

        self.get(account_id).await
    }

    /// Registered payout destination, if any
    pub async fn payout_destination(&self, account_id: Uuid) -> AppResult<Option<PayoutDestination>> {
        let row: Option<(Uuid, String, String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT user_id, bank_name, account_number, account_holder, created_at
            FROM payout_destinations
            WHERE user_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(account_id, bank_name, account_number, account_holder, created_at)| PayoutDestination {
                account_id,
                bank_name,
                account_number,
                account_holder,
                created_at,
            },
        ))
    }

    /// Register or replace the payout destination
    pub async fn save_payout_destination(
        &self,
        account_id: Uuid,
        bank_name: &str,
        account_number: &str,
        account_holder: &str,
    ) -> AppResult<PayoutDestination> {
        let (account_id, bank_name, account_number, account_holder, created_at): (
            Uuid,
            String,
            String,
            String,
            DateTime<Utc>,
        ) = sqlx::query_as(
            r#"
            INSERT INTO payout_destinations (user_id, bank_name, account_number, account_holder)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                bank_name = EXCLUDED.bank_name,
                account_number = EXCLUDED.account_number,
                account_holder = EXCLUDED.account_holder
            RETURNING user_id, bank_name, account_number, account_holder, created_at
            "#,
        )
        .bind(account_id)
        .bind(bank_name)
        .bind(account_number)
        .bind(account_holder)
        .fetch_one(&self.pool)
        .await?;

        Ok(PayoutDestination {
            account_id,
            bank_name,
            account_number,
            account_holder,
            created_at,
        })
    }
}
