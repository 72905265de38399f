//! Balance movements
//!
//! Pure computation of post-movement balances. The engines call these with
//! balances read under row locks and persist the result in the same
//! transaction.

use super::{Amount, Balance, DomainError};

/// New balances for both sides of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    pub sender_after: Balance,
    pub recipient_after: Balance,
}

impl TransferPlan {
    /// Compute the transfer, rejecting it when the sender would go negative
    /// or the recipient would pass `MAX_AMOUNT`.
    pub fn compute(sender: Balance, recipient: Balance, amount: Amount) -> Result<Self, DomainError> {
        let sender_after = sender
            .debit(&amount)
            .map_err(|_| DomainError::insufficient_funds(amount.value(), sender.value()))?;
        let recipient_after = recipient.credit(&amount).map_err(|_| {
            DomainError::BusinessRuleViolation(
                "Recipient balance would exceed the maximum allowed".to_string(),
            )
        })?;

        Ok(Self {
            sender_after,
            recipient_after,
        })
    }
}

/// Compute the balance left after a withdrawal.
pub fn plan_withdrawal(balance: Balance, amount: Amount) -> Result<Balance, DomainError> {
    balance
        .debit(&amount)
        .map_err(|_| DomainError::insufficient_funds(amount.value(), balance.value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAX_AMOUNT;

    fn bal(v: i64) -> Balance {
        Balance::new(v).unwrap()
    }

    fn amt(v: i64) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn test_transfer_scenario_1000_500_300() {
        let plan = TransferPlan::compute(bal(1000), bal(500), amt(300)).unwrap();
        assert_eq!(plan.sender_after.value(), 700);
        assert_eq!(plan.recipient_after.value(), 800);
    }

    #[test]
    fn test_transfer_conserves_total() {
        for (s, r, a) in [(1000, 500, 300), (1, 0, 1), (999, 1, 999), (50, 50, 25)] {
            let plan = TransferPlan::compute(bal(s), bal(r), amt(a)).unwrap();
            assert_eq!(
                plan.sender_after.value() + plan.recipient_after.value(),
                s + r,
                "conservation failed for ({s}, {r}, {a})"
            );
        }
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let err = TransferPlan::compute(bal(100), bal(0), amt(500)).unwrap_err();
        assert_eq!(err, DomainError::insufficient_funds(500, 100));
    }

    #[test]
    fn test_transfer_exact_balance_allowed() {
        let plan = TransferPlan::compute(bal(100), bal(0), amt(100)).unwrap();
        assert_eq!(plan.sender_after, Balance::zero());
    }

    #[test]
    fn test_recipient_overflow_is_business_rule() {
        let err = TransferPlan::compute(bal(10), bal(MAX_AMOUNT), amt(1)).unwrap_err();
        assert!(matches!(err, DomainError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_withdrawal_plan() {
        assert_eq!(plan_withdrawal(bal(200), amt(50)).unwrap().value(), 150);
        assert_eq!(
            plan_withdrawal(bal(200), amt(201)).unwrap_err(),
            DomainError::insufficient_funds(201, 200)
        );
    }
}
