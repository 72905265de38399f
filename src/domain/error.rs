//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use std::fmt;

use thiserror::Error;

/// Which side of an operation a precondition failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Recipient,
    Account,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Sender => write!(f, "sender"),
            Party::Recipient => write!(f, "recipient"),
            Party::Account => write!(f, "account"),
        }
    }
}

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant failures.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Resulting balance would be negative
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Account exists but has not passed verification
    #[error("The {party} account must be verified first")]
    AccountNotVerified { party: Party },

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Supplied PIN does not match the stored PIN
    #[error("PIN does not match")]
    AuthorizationMismatch,

    /// Withdrawal requested without a registered payout destination
    #[error("No payout destination registered; add one before withdrawing")]
    MissingPayoutDestination,

    /// Invalid amount (zero, negative, or exceeds limit)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transfer to same account
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    /// PIN is not a six digit number
    #[error("PIN must be exactly 6 digits")]
    InvalidPin,

    /// Business rule violation
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: i64, available: i64) -> Self {
        Self::InsufficientFunds { required, available }
    }

    /// Create a not-verified error for one party
    pub fn not_verified(party: Party) -> Self {
        Self::AccountNotVerified { party }
    }
}

impl From<super::AmountError> for DomainError {
    fn from(err: super::AmountError) -> Self {
        DomainError::InvalidAmount(err.to_string())
    }
}
