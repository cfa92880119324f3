// Token ledger routes: accounts, balances, allowances, transfers

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use tracing::{info, warn};

use crate::app_state::{lock_state, SharedState};
use crate::ledger::TokenLedger;
use crate::models::*;

const DEFAULT_ACTIVITY_LIMIT: usize = 50;

/// GET /accounts
pub async fn get_accounts(State(state): State<SharedState>) -> Result<Json<Vec<AccountView>>, ApiError> {
    let app = lock_state(&state)?;
    let accounts = app
        .ledger
        .named_accounts()
        .into_iter()
        .map(|(name, address)| AccountView {
            balance: app.ledger.balance_of(&address),
            name,
            address,
        })
        .collect();
    Ok(Json(accounts))
}

/// GET /balance/:account
pub async fn get_balance(
    State(state): State<SharedState>,
    Path(account): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let app = lock_state(&state)?;
    let address = app.resolve(&account)?;
    Ok(Json(BalanceResponse {
        balance: app.ledger.balance_of(&address),
        token: app.ledger.token_id().to_string(),
        address,
    }))
}

/// POST /approve
/// Adds to the owner -> spender allowance (increaseAllowance semantics)
pub async fn approve(
    State(state): State<SharedState>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<AllowanceResponse>, ApiError> {
    let mut app = lock_state(&state)?;
    let owner = app.resolve(&request.owner)?;
    let spender = app.resolve(&request.spender)?;
    if let Err(e) = app.ensure_not_escrow(&owner) {
        warn!(owner = %owner.short(), "approve rejected: escrow account cannot grant allowances");
        return Err(e);
    }
    let allowance = app.ledger.increase_allowance(&owner, &spender, request.amount)?;

    info!(owner = %owner.short(), spender = %spender.short(), allowance, "allowance increased");
    Ok(Json(AllowanceResponse {
        success: true,
        owner,
        spender,
        allowance,
    }))
}

/// POST /transfer
pub async fn transfer(
    State(state): State<SharedState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    let mut app = lock_state(&state)?;
    let from = app.resolve(&request.from)?;
    let to = app.resolve(&request.to)?;
    if let Err(e) = app.ensure_not_escrow(&from) {
        warn!(from = %from.short(), "transfer rejected: escrow balance is held in custody");
        return Err(e);
    }
    app.ledger.transfer(&from, &to, request.amount)?;

    Ok(Json(TransferResponse {
        success: true,
        from_balance: app.ledger.balance_of(&from),
        from,
        to,
        amount: request.amount,
    }))
}

/// GET /ledger?limit=N
pub async fn get_ledger_activity(
    State(state): State<SharedState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<LedgerActivityResponse>, ApiError> {
    let app = lock_state(&state)?;
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    Ok(Json(LedgerActivityResponse {
        stats: app.ledger.stats(),
        transactions: app.ledger.recent_transactions(limit).into_iter().cloned().collect(),
    }))
}
