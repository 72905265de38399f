//! Command definitions
//!
//! Commands represent intentions to change the system state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =========================================================================
// Registration
// =========================================================================

/// Command to register a new account with its wallet
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCommand {
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    pub password: String,
    pub pin: String,
}

impl RegisterCommand {
    /// First blank required field, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("username", &self.username),
            ("email", &self.email),
            ("password", &self.password),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePinCommand {
    pub old_pin: String,
    pub new_pin: String,
}

// =========================================================================
// Transfer
// =========================================================================

/// Command to move funds to another account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub recipient_id: Uuid,
    /// Minor units
    pub amount: i64,
    pub pin: String,
}

/// Result of a successful transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub transfer_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub amount: i64,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// Withdrawal
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawCommand {
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawResult {
    pub withdrawal_id: Uuid,
    pub amount: i64,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// Top-up
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopupCommand {
    pub amount: i64,
}
