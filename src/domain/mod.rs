//! Domain module
//!
//! Core domain types and business logic.

pub mod amount;
pub mod context;
pub mod error;
pub mod movement;
pub mod records;

pub use amount::{Amount, AmountError, Balance, MAX_AMOUNT};
pub use context::OperationContext;
pub use error::{DomainError, Party};
pub use movement::{plan_withdrawal, TransferPlan};
pub use records::{
    Direction, TopupRecord, TopupStatus, TransferRecord, VerificationStatus, WithdrawalRecord,
};
