//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{Account, AccountRepository, PayoutDestination, ProfileChanges};
use crate::auth::{password::constant_time_eq, IssuedToken, Role};
use crate::domain::{
    DomainError, OperationContext, Party, TopupRecord, TopupStatus, TransferRecord,
    WithdrawalRecord,
};
use crate::error::{AppError, AppResult};
use crate::handlers::{
    ChangePinCommand, ChangePinHandler, CreateUserHandler, LoginCommand, LoginHandler,
    RegisterCommand, TopupCommand, TopupHandler, TransferCommand, TransferHandler, TransferResult,
    WithdrawCommand, WithdrawResult, WithdrawalHandler,
};
use crate::ledger::LedgerStore;
use crate::query::{normalize_page, HistoryService};
use crate::state::AppState;
use crate::topup::PaymentNotification;

use super::middleware::{auth_middleware, require_admin};

/// Header guarding admin self-registration
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<i64>,
}

/// One page of history, newest first
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub page: i64,
    pub page_size: i64,
    pub items: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_id: Uuid,
    pub balance: i64,
}

#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub document: String,
}

#[derive(Debug, Deserialize)]
pub struct PayoutDestinationRequest {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

#[derive(Debug, Serialize)]
pub struct TopupResponse {
    pub order_id: Uuid,
    pub amount: i64,
    pub status: TopupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TopupRecord> for TopupResponse {
    fn from(record: TopupRecord) -> Self {
        Self {
            order_id: record.order_id,
            amount: record.amount,
            status: record.status,
            redirect_url: record.redirect_url,
            created_at: record.created_at,
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router.
///
/// Public routes need no token; everything else runs behind
/// `auth_middleware`, and `/admin/users/*` additionally behind `require_admin`.
pub fn create_router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
        .route("/admin/register", post(register_admin))
        .route("/topups/notification", post(topup_notification));

    let protected = Router::new()
        .route("/users/me", get(get_me).put(update_me))
        .route("/users/me/balance", get(get_my_balance))
        .route("/users/me/verification", post(submit_verification))
        .route("/users/me/pin", put(change_pin))
        .route(
            "/users/me/payout-destination",
            get(get_payout_destination).post(save_payout_destination),
        )
        .route("/transfers", post(transfer))
        .route("/transfers/sent", get(my_sent_transfers))
        .route("/transfers/received", get(my_received_transfers))
        .route("/withdrawals", post(withdraw).get(my_withdrawals))
        .route("/topups", post(create_topup).get(my_topups));

    let admin = Router::new()
        .route("/admin/users/:id", get(admin_get_user))
        .route("/admin/users/:id/balance", get(admin_get_balance))
        .route("/admin/users/:id/verify", post(admin_verify_user))
        .route("/admin/users/:id/transfers/sent", get(admin_sent_transfers))
        .route("/admin/users/:id/transfers/received", get(admin_received_transfers))
        .route("/admin/users/:id/withdrawals", get(admin_withdrawals))
        .route("/admin/users/:id/topups", get(admin_topups))
        .route_layer(from_fn(require_admin));

    let authenticated = protected
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    public.merge(authenticated)
}

// =========================================================================
// Registration and login
// =========================================================================

/// POST /users
async fn register(
    State(state): State<AppState>,
    Json(command): Json<RegisterCommand>,
) -> AppResult<(StatusCode, Json<Account>)> {
    let account = CreateUserHandler::new(state.pool)
        .execute(command, Role::User)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// POST /admin/register, guarded by the bootstrap key
async fn register_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(command): Json<RegisterCommand>,
) -> AppResult<(StatusCode, Json<Account>)> {
    let Some(expected) = state.config.admin_registration_key.as_deref() else {
        return Err(AppError::Forbidden("admin registration is disabled".to_string()));
    };

    let supplied = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !constant_time_eq(supplied.as_bytes(), expected.as_bytes()) {
        return Err(AppError::Forbidden("invalid admin key".to_string()));
    }

    let account = CreateUserHandler::new(state.pool)
        .execute(command, Role::Admin)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// POST /users/login
async fn login(
    State(state): State<AppState>,
    Json(command): Json<LoginCommand>,
) -> AppResult<Json<IssuedToken>> {
    let token = LoginHandler::new(state.pool, state.tokens).execute(command).await?;
    Ok(Json(token))
}

// =========================================================================
// Self-service profile
// =========================================================================

/// GET /users/me
async fn get_me(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> AppResult<Json<Account>> {
    Ok(Json(AccountRepository::new(state.pool).get(context.actor_id).await?))
}

/// PUT /users/me
async fn update_me(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(changes): Json<ProfileChanges>,
) -> AppResult<Json<Account>> {
    if changes.is_empty() {
        return Err(AppError::InvalidRequest("no profile fields to update".to_string()));
    }
    let account = AccountRepository::new(state.pool)
        .update_profile(context.actor_id, changes)
        .await?;
    Ok(Json(account))
}

/// GET /users/me/balance, verified accounts only
async fn get_my_balance(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> AppResult<Json<BalanceResponse>> {
    AccountRepository::new(state.pool.clone())
        .get_verified(context.actor_id, Party::Account)
        .await?;
    balance_response(&state, context.actor_id).await
}

/// POST /users/me/verification
async fn submit_verification(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<VerificationRequest>,
) -> AppResult<Json<Account>> {
    if request.document.trim().is_empty() {
        return Err(AppError::InvalidRequest("document is required".to_string()));
    }
    let account = AccountRepository::new(state.pool)
        .submit_verification(context.actor_id, request.document.trim())
        .await?;
    Ok(Json(account))
}

/// PUT /users/me/pin
async fn change_pin(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<ChangePinCommand>,
) -> AppResult<StatusCode> {
    ChangePinHandler::new(state.pool).execute(command, &context).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me/payout-destination
async fn get_payout_destination(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> AppResult<Json<PayoutDestination>> {
    AccountRepository::new(state.pool)
        .payout_destination(context.actor_id)
        .await?
        .map(Json)
        .ok_or_else(|| DomainError::MissingPayoutDestination.into())
}

/// POST /users/me/payout-destination
async fn save_payout_destination(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<PayoutDestinationRequest>,
) -> AppResult<Json<PayoutDestination>> {
    let fields = [
        ("bank_name", &request.bank_name),
        ("account_number", &request.account_number),
        ("account_holder", &request.account_holder),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(AppError::InvalidRequest(format!("{} is required", field)));
    }

    let destination = AccountRepository::new(state.pool)
        .save_payout_destination(
            context.actor_id,
            request.bank_name.trim(),
            request.account_number.trim(),
            request.account_holder.trim(),
        )
        .await?;
    Ok(Json(destination))
}

// =========================================================================
// Transfers and withdrawals
// =========================================================================

/// POST /transfers
async fn transfer(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<TransferCommand>,
) -> AppResult<(StatusCode, Json<TransferResult>)> {
    let result = TransferHandler::new(state.pool).execute(command, &context).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /withdrawals
async fn withdraw(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<WithdrawCommand>,
) -> AppResult<(StatusCode, Json<WithdrawResult>)> {
    let result = WithdrawalHandler::new(state.pool)
        .execute(command, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

// =========================================================================
// Top-ups
// =========================================================================

/// POST /topups
async fn create_topup(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<TopupCommand>,
) -> AppResult<(StatusCode, Json<TopupResponse>)> {
    let handler = TopupHandler::new(AccountRepository::new(state.pool.clone()), state.topups());
    let record = handler.execute(command, &context).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// POST /topups/notification, called by the payment gateway
async fn topup_notification(
    State(state): State<AppState>,
    Json(notification): Json<PaymentNotification>,
) -> AppResult<Json<TopupResponse>> {
    let record = state
        .topups()
        .apply_notification(&notification, &state.config.gateway.server_key)
        .await?;
    Ok(Json(record.into()))
}

// =========================================================================
// History (self)
// =========================================================================

async fn my_sent_transfers(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<TransferRecord>>> {
    sent_page(&state, context.actor_id, query).await
}

async fn my_received_transfers(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<TransferRecord>>> {
    received_page(&state, context.actor_id, query).await
}

async fn my_withdrawals(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<WithdrawalRecord>>> {
    withdrawals_page(&state, context.actor_id, query).await
}

async fn my_topups(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<TopupResponse>>> {
    topups_page(&state, context.actor_id, query).await
}

// =========================================================================
// Admin
// =========================================================================

/// GET /admin/users/:id
async fn admin_get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Account>> {
    Ok(Json(AccountRepository::new(state.pool).get(id).await?))
}

/// GET /admin/users/:id/balance
async fn admin_get_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BalanceResponse>> {
    balance_response(&state, id).await
}

/// POST /admin/users/:id/verify
async fn admin_verify_user(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Account>> {
    let account = AccountRepository::new(state.pool).approve_verification(id).await?;
    tracing::info!(account = %id, admin = %context.actor_id, "Account verified");
    Ok(Json(account))
}

async fn admin_sent_transfers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<TransferRecord>>> {
    sent_page(&state, id, query).await
}

async fn admin_received_transfers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<TransferRecord>>> {
    received_page(&state, id, query).await
}

async fn admin_withdrawals(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<WithdrawalRecord>>> {
    withdrawals_page(&state, id, query).await
}

async fn admin_topups(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<TopupResponse>>> {
    topups_page(&state, id, query).await
}

// =========================================================================
// Shared readers
// =========================================================================

async fn balance_response(state: &AppState, account_id: Uuid) -> AppResult<Json<BalanceResponse>> {
    let balance = LedgerStore::new(state.pool.clone())
        .balance_of(account_id)
        .await?
        .ok_or_else(|| DomainError::AccountNotFound(account_id.to_string()))?;

    Ok(Json(BalanceResponse {
        account_id,
        balance: balance.value(),
    }))
}

fn page_of<T>(
    history: &HistoryService,
    query: &PageQuery,
    items: Vec<T>,
) -> Json<PageResponse<T>> {
    Json(PageResponse {
        page: normalize_page(query.page),
        page_size: history.page_size(),
        items,
    })
}

async fn sent_page(
    state: &AppState,
    account_id: Uuid,
    query: PageQuery,
) -> AppResult<Json<PageResponse<TransferRecord>>> {
    let history = state.history();
    let items = history.sent(account_id, query.page).await?;
    Ok(page_of(&history, &query, items))
}

async fn received_page(
    state: &AppState,
    account_id: Uuid,
    query: PageQuery,
) -> AppResult<Json<PageResponse<TransferRecord>>> {
    let history = state.history();
    let items = history.received(account_id, query.page).await?;
    Ok(page_of(&history, &query, items))
}

async fn withdrawals_page(
    state: &AppState,
    account_id: Uuid,
    query: PageQuery,
) -> AppResult<Json<PageResponse<WithdrawalRecord>>> {
    let history = state.history();
    let items = history.withdrawals(account_id, query.page).await?;
    Ok(page_of(&history, &query, items))
}

async fn topups_page(
    state: &AppState,
    account_id: Uuid,
    query: PageQuery,
) -> AppResult<Json<PageResponse<TopupResponse>>> {
    let history = state.history();
    let items = history.topups(account_id, query.page).await?;
    Ok(page_of(&history, &query, items.into_iter().map(Into::into).collect()))
}
