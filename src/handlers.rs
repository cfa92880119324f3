// HTTP request handlers for the escrow endpoints

use axum::{extract::State, response::Json};
use tracing::warn;

use crate::app_state::{lock_state, SharedState};
use crate::escrow::{FixedPartyStatus, Outcome, PooledMarketStatus, Winner};
use crate::ledger::TokenLedger;
use crate::models::*;

// ===== FIXED-PARTY ESCROW =====

/// GET /escrows/fixed
pub async fn get_fixed_escrow(State(state): State<SharedState>) -> Result<Json<FixedPartyStatus>, ApiError> {
    let app = lock_state(&state)?;
    Ok(Json(app.fixed.status(&app.ledger)))
}

/// POST /escrows/fixed/deposit
pub async fn fixed_deposit(
    State(state): State<SharedState>,
    Json(request): Json<FixedDepositRequest>,
) -> Result<Json<DepositResponse>, ApiError> {
    let mut guard = lock_state(&state)?;
    let app = &mut *guard;
    let caller = app.resolve(&request.caller)?;

    if let Err(e) = app.fixed.deposit(&mut app.ledger, &caller) {
        warn!(caller = %caller.short(), kind = e.kind(), "fixed deposit failed");
        return Err(e.into());
    }

    Ok(Json(DepositResponse {
        success: true,
        caller,
        stake: app.fixed.stake(),
        outcome: None,
        escrow_balance: app.ledger.balance_of(app.fixed.account()),
    }))
}

/// POST /escrows/fixed/settle
pub async fn fixed_settle(
    State(state): State<SharedState>,
    Json(request): Json<SettleRequest>,
) -> Result<Json<FixedSettleResponse>, ApiError> {
    let winner = Winner::try_from(request.outcome)?;

    let mut guard = lock_state(&state)?;
    let app = &mut *guard;
    let caller = app.resolve(&request.caller)?;

    let amount = app.fixed.settle(&mut app.ledger, &caller, winner).map_err(|e| {
        warn!(caller = %caller.short(), kind = e.kind(), "fixed settle failed");
        ApiError::from(e)
    })?;

    Ok(Json(FixedSettleResponse {
        success: true,
        winner,
        payee: app.fixed.party(winner).clone(),
        amount,
    }))
}

// ===== POOLED MARKET ESCROW =====

/// GET /escrows/pooled
pub async fn get_pooled_escrow(State(state): State<SharedState>) -> Result<Json<PooledMarketStatus>, ApiError> {
    let app = lock_state(&state)?;
    Ok(Json(app.pooled.status(&app.ledger)))
}

/// POST /escrows/pooled/deposit
pub async fn pooled_deposit(
    State(state): State<SharedState>,
    Json(request): Json<PooledDepositRequest>,
) -> Result<Json<DepositResponse>, ApiError> {
    let outcome = Outcome::try_from(request.outcome)?;

    let mut guard = lock_state(&state)?;
    let app = &mut *guard;
    let caller = app.resolve(&request.caller)?;

    if let Err(e) = app.pooled.deposit(&mut app.ledger, &caller, outcome) {
        warn!(caller = %caller.short(), kind = e.kind(), "pooled deposit failed");
        return Err(e.into());
    }

    Ok(Json(DepositResponse {
        success: true,
        caller,
        stake: app.pooled.stake(),
        outcome: Some(outcome),
        escrow_balance: app.ledger.balance_of(app.pooled.account()),
    }))
}

/// POST /escrows/pooled/settle
pub async fn pooled_settle(
    State(state): State<SharedState>,
    Json(request): Json<SettleRequest>,
) -> Result<Json<PooledSettleResponse>, ApiError> {
    let outcome = Outcome::try_from(request.outcome)?;

    let mut guard = lock_state(&state)?;
    let app = &mut *guard;
    let caller = app.resolve(&request.caller)?;

    let settlement = app.pooled.settle(&mut app.ledger, &caller, outcome).map_err(|e| {
        warn!(caller = %caller.short(), kind = e.kind(), "pooled settle failed");
        ApiError::from(e)
    })?;

    Ok(Json(PooledSettleResponse {
        success: true,
        winning_outcome: settlement.winning_outcome,
        reward_per_winner: settlement.reward_per_winner,
        payouts: settlement
            .payouts
            .into_iter()
            .map(|(address, amount)| PayoutView { address, amount })
            .collect(),
        residual: settlement.residual,
    }))
}
