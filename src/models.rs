// Request/response models for the escrow HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::escrow::{EscrowError, Outcome, Winner};
use crate::ledger::{Address, Amount, LedgerError, LedgerStats, Transaction};

// ===== REQUESTS =====

#[derive(Debug, Deserialize)]
pub struct FixedDepositRequest {
    /// Account name or address
    pub caller: String,
}

#[derive(Debug, Deserialize)]
pub struct PooledDepositRequest {
    pub caller: String,
    /// 0 or 1
    pub outcome: u8,
}

#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    pub caller: String,
    /// Fixed escrow: 0 pays party B, 1 pays party A. Pooled: winning pool.
    pub outcome: u8,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub owner: String,
    /// Account name, address, or FIXED / POOLED for the escrows
    pub spender: String,
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    pub limit: Option<usize>,
}

// ===== RESPONSES =====

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub name: String,
    pub address: Address,
    pub balance: Amount,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: Address,
    pub token: String,
    pub balance: Amount,
}

#[derive(Debug, Serialize)]
pub struct AllowanceResponse {
    pub success: bool,
    pub owner: Address,
    pub spender: Address,
    pub allowance: Amount,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub success: bool,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub from_balance: Amount,
}

#[derive(Debug, Serialize)]
pub struct DepositResponse {
    pub success: bool,
    pub caller: Address,
    pub stake: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub escrow_balance: Amount,
}

#[derive(Debug, Serialize)]
pub struct FixedSettleResponse {
    pub success: bool,
    pub winner: Winner,
    pub payee: Address,
    pub amount: Amount,
}

#[derive(Debug, Serialize)]
pub struct PayoutView {
    pub address: Address,
    pub amount: Amount,
}

#[derive(Debug, Serialize)]
pub struct PooledSettleResponse {
    pub success: bool,
    pub winning_outcome: Outcome,
    pub reward_per_winner: Amount,
    pub payouts: Vec<PayoutView>,
    pub residual: Amount,
}

/// Amounts can exceed u64, so responses are serialized from typed structs
/// rather than `serde_json::Value`.
#[derive(Debug, Serialize)]
pub struct LedgerActivityResponse {
    pub stats: LedgerStats,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub kind: &'static str,
    pub error: String,
}

// ===== API ERRORS =====

#[derive(Debug)]
pub enum ApiError {
    Escrow(EscrowError),
    Ledger(LedgerError),
    AccountNotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Escrow(err) => err.kind(),
            ApiError::Ledger(LedgerError::InsufficientBalance { .. }) => "insufficient_balance",
            ApiError::Ledger(LedgerError::InsufficientAllowance { .. }) => "insufficient_allowance",
            ApiError::Ledger(_) => "ledger",
            ApiError::AccountNotFound(_) => "account_not_found",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Escrow(err) => match err {
                EscrowError::Unauthorized => StatusCode::FORBIDDEN,
                EscrowError::InsufficientAllowance { .. } => StatusCode::PAYMENT_REQUIRED,
                EscrowError::AlreadyDeposited
                | EscrowError::PartyANotDeposited
                | EscrowError::PartyBNotDeposited
                | EscrowError::EmptyPool(_)
                | EscrowError::AlreadySettled => StatusCode::CONFLICT,
                EscrowError::InvalidOutcome(_) => StatusCode::BAD_REQUEST,
                EscrowError::Ledger(LedgerError::InsufficientBalance { .. }) => StatusCode::PAYMENT_REQUIRED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Ledger(err) => match err {
                LedgerError::InsufficientBalance { .. } | LedgerError::InsufficientAllowance { .. } => {
                    StatusCode::PAYMENT_REQUIRED
                }
                LedgerError::ArithmeticOverflow => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Escrow(err) => write!(f, "{}", err),
            ApiError::Ledger(err) => write!(f, "{}", err),
            ApiError::AccountNotFound(id) => write!(f, "Account not found: {}", id),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<EscrowError> for ApiError {
    fn from(err: EscrowError) -> Self {
        ApiError::Escrow(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            kind: self.kind(),
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
