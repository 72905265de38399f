//! User Handlers
//!
//! Registration, login and PIN changes.

use sqlx::PgPool;

use crate::accounts::{Account, AccountRepository, NewAccount};
use crate::auth::{password, AuthError, IssuedToken, Role, TokenService};
use crate::domain::{DomainError, OperationContext};
use crate::error::AppError;
use crate::ledger::LedgerStore;

use super::{ChangePinCommand, LoginCommand, RegisterCommand};

/// Handler for account registration
pub struct CreateUserHandler {
    accounts: AccountRepository,
    ledger: LedgerStore,
    pool: PgPool,
}

impl CreateUserHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            ledger: LedgerStore::new(pool.clone()),
            pool,
        }
    }

    /// Create the account and its zero balance in one transaction
    pub async fn execute(&self, command: RegisterCommand, role: Role) -> Result<Account, AppError> {
        if let Some(field) = command.missing_field() {
            return Err(AppError::InvalidRequest(format!("{} is required", field)));
        }
        if !password::is_valid_pin(&command.pin) {
            return Err(DomainError::InvalidPin.into());
        }

        let mut tx = self.pool.begin().await?;

        let account = self
            .accounts
            .create(
                &mut tx,
                NewAccount {
                    name: command.name,
                    username: command.username,
                    email: command.email,
                    phone_number: command.phone_number,
                    password_hash: password::hash_secret(&command.password),
                    role,
                },
            )
            .await?;

        self.ledger.create(&mut tx, account.id, &command.pin).await?;

        tx.commit().await?;

        tracing::info!(account = %account.id, role = %account.role.as_str(), "Account registered");

        Ok(account)
    }
}

/// Handler for password login
pub struct LoginHandler {
    accounts: AccountRepository,
    tokens: TokenService,
}

impl LoginHandler {
    pub fn new(pool: PgPool, tokens: TokenService) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            tokens,
        }
    }

    pub async fn execute(&self, command: LoginCommand) -> Result<IssuedToken, AppError> {
        let Some((account, password_hash)) =
            self.accounts.find_credentials(&command.username).await?
        else {
            return Err(AuthError::InvalidCredentials.into());
        };

        if !password::verify_secret(&command.password, &password_hash) {
            tracing::info!(account = %account.id, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(self.tokens.issue(account.id, &account.name, account.role)?)
    }
}

/// Handler for PIN changes
pub struct ChangePinHandler {
    ledger: LedgerStore,
}

impl ChangePinHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            ledger: LedgerStore::new(pool),
        }
    }

    pub async fn execute(
        &self,
        command: ChangePinCommand,
        context: &OperationContext,
    ) -> Result<(), AppError> {
        if !password::is_valid_pin(&command.new_pin) {
            return Err(DomainError::InvalidPin.into());
        }
        if !self.ledger.verify_pin(context.actor_id, &command.old_pin).await? {
            return Err(DomainError::AuthorizationMismatch.into());
        }

        self.ledger.update_pin(context.actor_id, &command.new_pin).await?;
        tracing::info!(account = %context.actor_id, "PIN changed");
        Ok(())
    }
}
