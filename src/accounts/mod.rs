//! Accounts module
//!
//! Account lookup, verification status and payout destinations.

mod repository;

pub use repository::{
    Account, AccountRepository, NewAccount, PayoutDestination, ProfileChanges,
};
