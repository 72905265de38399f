//! Funds movement engines
//!
//! Each engine call is one database transaction: balance rows are locked,
//! re-read, checked and rewritten together with the ledger record inserts.
//! Any failure drops the transaction and leaves no partial effect.

mod transfer;
mod withdrawal;

pub use transfer::{TransferEngine, TransferOutcome};
pub use withdrawal::{WithdrawalEngine, WithdrawalOutcome};

use crate::domain::DomainError;
use crate::ledger::LedgerError;

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EngineError {
    /// Check if the failure is a persistence failure that may be retried
    /// after re-fetching balances
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Database(e) | EngineError::Ledger(LedgerError::Database(e)) => {
                crate::error::is_transient_db_error(e)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_rejection_is_not_retryable() {
        let err: EngineError = DomainError::insufficient_funds(10, 1).into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_pool_timeout_is_retryable() {
        assert!(EngineError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(EngineError::Ledger(LedgerError::Database(sqlx::Error::PoolTimedOut)).is_retryable());
    }
}
