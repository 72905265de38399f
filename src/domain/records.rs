//! Ledger records
//!
//! Immutable rows describing one side of a money movement, plus the
//! status enums stored alongside accounts and top-ups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which side of a transfer a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outgoing => "outgoing",
            Direction::Incoming => "incoming",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "outgoing" => Some(Direction::Outgoing),
            "incoming" => Some(Direction::Incoming),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a peer-to-peer transfer.
///
/// Every committed transfer produces an `Outgoing` record and an `Incoming`
/// record whose `link_id` is the outgoing record's `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: Uuid,
    pub sender_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub recipient_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    pub amount: i64,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A debit paid out to the account's payout destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a third-party top-up payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopupStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl TopupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopupStatus::Pending => "pending",
            TopupStatus::Paid => "paid",
            TopupStatus::Failed => "failed",
            TopupStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TopupStatus::Pending),
            "paid" => Some(TopupStatus::Paid),
            "failed" => Some(TopupStatus::Failed),
            "expired" => Some(TopupStatus::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for TopupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopupRecord {
    pub order_id: Uuid,
    pub account_id: Uuid,
    pub amount: i64,
    pub status: TopupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account verification gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unverified" => Some(VerificationStatus::Unverified),
            "pending" => Some(VerificationStatus::Pending),
            "verified" => Some(VerificationStatus::Verified),
            _ => None,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationStatus::Verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trips_through_storage_text() {
        for direction in [Direction::Outgoing, Direction::Incoming] {
            assert_eq!(Direction::parse(direction.as_str()), Some(direction));
        }
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_topup_status_parse() {
        assert_eq!(TopupStatus::parse("paid"), Some(TopupStatus::Paid));
        assert_eq!(TopupStatus::parse("settlement"), None);
    }

    #[test]
    fn test_only_verified_passes_gate() {
        assert!(VerificationStatus::Verified.is_verified());
        assert!(!VerificationStatus::Pending.is_verified());
        assert!(!VerificationStatus::Unverified.is_verified());
    }

    #[test]
    fn test_transfer_record_serializes_direction_lowercase() {
        let record = TransferRecord {
            id: Uuid::nil(),
            sender_id: Uuid::nil(),
            sender_name: None,
            recipient_id: Uuid::nil(),
            recipient_name: Some("Bob".to_string()),
            amount: 300,
            direction: Direction::Outgoing,
            link_id: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["direction"], "outgoing");
        assert_eq!(json["recipient_name"], "Bob");
        assert!(json.get("link_id").is_none());
        assert!(json.get("sender_name").is_none());
    }
}
