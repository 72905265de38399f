//! Transfer Handler
//!
//! Checks the preconditions the engine relies on, then runs the transfer.

use sqlx::PgPool;

use crate::accounts::AccountRepository;
use crate::domain::{Amount, DomainError, OperationContext, Party};
use crate::engine::TransferEngine;
use crate::error::AppError;
use crate::ledger::LedgerStore;

use super::{TransferCommand, TransferResult};

/// Handler for peer-to-peer transfers
pub struct TransferHandler {
    accounts: AccountRepository,
    ledger: LedgerStore,
    engine: TransferEngine,
}

impl TransferHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            ledger: LedgerStore::new(pool.clone()),
            engine: TransferEngine::new(pool),
        }
    }

    /// Execute the transfer command on behalf of the context's actor
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferResult, AppError> {
        let sender_id = context.actor_id;

        let amount = Amount::new(command.amount)?;

        if sender_id == command.recipient_id {
            return Err(DomainError::SameAccountTransfer.into());
        }

        self.accounts.get_verified(sender_id, Party::Sender).await?;
        self.accounts
            .get_verified(command.recipient_id, Party::Recipient)
            .await?;

        if !self.ledger.verify_pin(sender_id, &command.pin).await? {
            tracing::info!(
                sender = %sender_id,
                correlation_id = ?context.correlation_id,
                "Transfer rejected: PIN mismatch"
            );
            return Err(DomainError::AuthorizationMismatch.into());
        }

        let outcome = self
            .engine
            .execute(sender_id, command.recipient_id, amount)
            .await?;

        Ok(TransferResult {
            transfer_id: outcome.outgoing.id,
            sender_id,
            recipient_id: command.recipient_id,
            amount: amount.value(),
            balance: outcome.sender_balance.value(),
            created_at: outcome.outgoing.created_at,
        })
    }
}
