//! Withdrawal Handler

use sqlx::PgPool;

use crate::accounts::AccountRepository;
use crate::domain::{Amount, DomainError, OperationContext, Party};
use crate::engine::WithdrawalEngine;
use crate::error::AppError;

use super::{WithdrawCommand, WithdrawResult};

/// Handler for withdrawals to the registered payout destination
pub struct WithdrawalHandler {
    accounts: AccountRepository,
    engine: WithdrawalEngine,
}

impl WithdrawalHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            engine: WithdrawalEngine::new(pool),
        }
    }

    pub async fn execute(
        &self,
        command: WithdrawCommand,
        context: &OperationContext,
    ) -> Result<WithdrawResult, AppError> {
        let account_id = context.actor_id;
        let amount = Amount::new(command.amount)?;

        self.accounts.get_verified(account_id, Party::Account).await?;

        if self.accounts.payout_destination(account_id).await?.is_none() {
            return Err(DomainError::MissingPayoutDestination.into());
        }

        let outcome = self.engine.execute(account_id, amount).await?;

        Ok(WithdrawResult {
            withdrawal_id: outcome.record.id,
            amount: outcome.record.amount,
            balance: outcome.balance.value(),
            created_at: outcome.record.created_at,
        })
    }
}
