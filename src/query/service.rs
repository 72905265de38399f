//! History reads
//!
//! Offset pagination ordered newest first. Pages are 1-based; anything at
//! or below zero reads as page 1. There is no total count: an empty page
//! means the caller has walked past the end.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Direction, TopupRecord, TopupStatus, TransferRecord, WithdrawalRecord};
use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: i64 = 3;

type TransferRow = (
    Uuid,
    Uuid,
    Option<String>,
    Uuid,
    Option<String>,
    i64,
    String,
    Option<Uuid>,
    DateTime<Utc>,
);

type TopupRow = (Uuid, Uuid, i64, String, Option<String>, DateTime<Utc>, DateTime<Utc>);

/// Clamp a requested page number to the first page
pub fn normalize_page(page: Option<i64>) -> i64 {
    match page {
        Some(p) if p > 0 => p,
        _ => 1,
    }
}

/// Rows to skip before `page`
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (normalize_page(Some(page)) - 1).saturating_mul(page_size)
}

#[derive(Debug, Clone)]
pub struct HistoryService {
    pool: PgPool,
    page_size: i64,
}

impl HistoryService {
    pub fn new(pool: PgPool, page_size: i64) -> Self {
        Self {
            pool,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Outgoing transfer records where the account is the sender
    pub async fn sent(&self, account_id: Uuid, page: Option<i64>) -> AppResult<Vec<TransferRecord>> {
        self.transfers(account_id, Direction::Outgoing, page).await
    }

    /// Incoming transfer records where the account is the recipient
    pub async fn received(
        &self,
        account_id: Uuid,
        page: Option<i64>,
    ) -> AppResult<Vec<TransferRecord>> {
        self.transfers(account_id, Direction::Incoming, page).await
    }

    async fn transfers(
        &self,
        account_id: Uuid,
        direction: Direction,
        page: Option<i64>,
    ) -> AppResult<Vec<TransferRecord>> {
        let owner_column = match direction {
            Direction::Outgoing => "t.sender_id",
            Direction::Incoming => "t.recipient_id",
        };

        let rows: Vec<TransferRow> = sqlx::query_as(&format!(
            r#"
            SELECT t.id, t.sender_id, s.name, t.recipient_id, r.name,
                   t.amount, t.direction, t.link_id, t.created_at
            FROM transfer_records t
            LEFT JOIN users s ON s.id = t.sender_id
            LEFT JOIN users r ON r.id = t.recipient_id
            WHERE {owner_column} = $1 AND t.direction = $2
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(account_id)
        .bind(direction.as_str())
        .bind(self.page_size)
        .bind(page_offset(normalize_page(page), self.page_size))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(transfer_from_row).collect()
    }

    /// Withdrawals made by the account
    pub async fn withdrawals(
        &self,
        account_id: Uuid,
        page: Option<i64>,
    ) -> AppResult<Vec<WithdrawalRecord>> {
        let rows: Vec<(Uuid, Uuid, i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, user_id, amount, created_at
            FROM withdrawals
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(self.page_size)
        .bind(page_offset(normalize_page(page), self.page_size))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, account_id, amount, created_at)| WithdrawalRecord {
                id,
                account_id,
                amount,
                created_at,
            })
            .collect())
    }

    /// Top-up attempts by the account, any status
    pub async fn topups(&self, account_id: Uuid, page: Option<i64>) -> AppResult<Vec<TopupRecord>> {
        let rows: Vec<TopupRow> = sqlx::query_as(
            r#"
            SELECT order_id, user_id, amount, status, redirect_url, created_at, updated_at
            FROM topups
            WHERE user_id = $1
            ORDER BY created_at DESC, order_id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(self.page_size)
        .bind(page_offset(normalize_page(page), self.page_size))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(topup_from_row).collect()
    }
}

fn transfer_from_row(row: TransferRow) -> AppResult<TransferRecord> {
    let (id, sender_id, sender_name, recipient_id, recipient_name, amount, direction, link_id, created_at) =
        row;
    let direction = Direction::parse(&direction)
        .ok_or_else(|| AppError::Internal(format!("unknown direction '{}' on {}", direction, id)))?;

    Ok(TransferRecord {
        id,
        sender_id,
        sender_name,
        recipient_id,
        recipient_name,
        amount,
        direction,
        link_id,
        created_at,
    })
}

pub(crate) fn topup_from_row(row: TopupRow) -> AppResult<TopupRecord> {
    let (order_id, account_id, amount, status, redirect_url, created_at, updated_at) = row;
    let status = TopupStatus::parse(&status)
        .ok_or_else(|| AppError::Internal(format!("unknown topup status '{}' on {}", status, order_id)))?;

    Ok(TopupRecord {
        order_id,
        account_id,
        amount,
        status,
        redirect_url,
        created_at,
        updated_at,
    })
}
