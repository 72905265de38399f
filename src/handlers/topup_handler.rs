//! Top-up Handler

use crate::accounts::AccountRepository;
use crate::domain::{Amount, OperationContext, Party, TopupRecord};
use crate::error::AppError;
use crate::topup::TopupService;

use super::TopupCommand;

/// Handler for opening a top-up checkout
pub struct TopupHandler {
    accounts: AccountRepository,
    topups: TopupService,
}

impl TopupHandler {
    pub fn new(accounts: AccountRepository, topups: TopupService) -> Self {
        Self { accounts, topups }
    }

    pub async fn execute(
        &self,
        command: TopupCommand,
        context: &OperationContext,
    ) -> Result<TopupRecord, AppError> {
        let amount = Amount::new(command.amount)?;
        let account = self
            .accounts
            .get_verified(context.actor_id, Party::Account)
            .await?;

        self.topups.create(&account, amount).await
    }
}
