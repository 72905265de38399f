//! Amount type
//!
//! Domain primitives for monetary values in integer minor units.
//! All amounts are validated at construction time, ensuring invalid values
//! cannot exist in the system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum allowed single amount or balance (one trillion minor units)
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Amount represents a validated movement of money.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum value is [`MAX_AMOUNT`]
///
/// # Example
/// ```
/// use e_wallet::domain::Amount;
///
/// let amount = Amount::new(300).unwrap();
/// assert_eq!(amount.value(), 300);
/// assert!(Amount::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(i64),

    #[error("Balance cannot be negative (got {0})")]
    Negative(i64),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::Overflow` if value > [`MAX_AMOUNT`]
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            return Err(AmountError::NotPositive(value));
        }
        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }
        Ok(Self(value))
    }

    /// Get the underlying minor-unit value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Balance represents an account balance (zero or positive).
/// Unlike Amount, Balance can be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(i64);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value < 0 {
            return Err(AmountError::Negative(value));
        }
        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }
        Ok(Self(value))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the underlying value
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Add amount to balance
    pub fn credit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        let new_value = self.0.checked_add(amount.value()).ok_or(AmountError::Overflow)?;
        Balance::new(new_value)
    }

    /// Subtract amount from balance
    pub fn debit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        Balance::new(self.0 - amount.value())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(100).unwrap();
        assert_eq!(amount.value(), 100);
    }

    #[test]
    fn test_amount_zero_rejected() {
        assert_eq!(Amount::new(0), Err(AmountError::NotPositive(0)));
    }

    #[test]
    fn test_amount_negative_rejected() {
        assert_eq!(Amount::new(-100), Err(AmountError::NotPositive(-100)));
    }

    #[test]
    fn test_amount_overflow() {
        assert_eq!(Amount::new(MAX_AMOUNT + 1), Err(AmountError::Overflow));
        assert!(Amount::new(MAX_AMOUNT).is_ok());
    }

    #[test]
    fn test_amount_deserialize_validates() {
        let ok: Amount = serde_json::from_str("250").unwrap();
        assert_eq!(ok.value(), 250);

        assert!(serde_json::from_str::<Amount>("0").is_err());
        assert!(serde_json::from_str::<Amount>("-5").is_err());
    }

    #[test]
    fn test_balance_credit_debit() {
        let balance = Balance::zero();
        let balance = balance.credit(&Amount::new(100).unwrap()).unwrap();
        assert_eq!(balance.value(), 100);

        let balance = balance.debit(&Amount::new(30).unwrap()).unwrap();
        assert_eq!(balance.value(), 70);
    }

    #[test]
    fn test_balance_exact_debit_reaches_zero() {
        let balance = Balance::new(100).unwrap();
        let balance = balance.debit(&Amount::new(100).unwrap()).unwrap();
        assert_eq!(balance, Balance::zero());
    }

    #[test]
    fn test_balance_insufficient() {
        let balance = Balance::new(50).unwrap();
        let amount = Amount::new(100).unwrap();

        assert_eq!(balance.debit(&amount), Err(AmountError::Negative(-50)));
    }

    #[test]
    fn test_balance_credit_overflow() {
        let balance = Balance::new(MAX_AMOUNT).unwrap();
        assert_eq!(balance.credit(&Amount::new(1).unwrap()), Err(AmountError::Overflow));
    }
}
