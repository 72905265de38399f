//! Command Handlers module
//!
//! Handlers validate preconditions (existence, verification, PIN, payout
//! destination) and then hand off to the engines and services.

mod commands;
mod topup_handler;
mod transfer_handler;
mod user_handler;
mod withdrawal_handler;


pub use commands::*;
pub use topup_handler::TopupHandler;
pub use transfer_handler::TransferHandler;
pub use user_handler::{ChangePinHandler, CreateUserHandler, LoginHandler};
pub use withdrawal_handler::WithdrawalHandler;
