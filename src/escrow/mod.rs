// ============================================================================
// Escrow Module - BlackBook Wager Settlement
// ============================================================================
//
// Two custody engines sharing one shape:
//   - fixed_party: two named parties, winner takes the whole balance
//   - pooled: open binary market, losing pool split across winning pool
//
// Lifecycle (both): Open -> Settled. Settled is terminal.
//
// Engines hold only deposit bookkeeping. Balances live in the TokenLedger
// passed into every call.
//
// ============================================================================

pub mod fixed_party;
pub mod pooled;

pub use fixed_party::*;
pub use pooled::*;

use crate::ledger::{Amount, LedgerError, TokenLedger};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// OUTCOMES
// ============================================================================

/// Side of a binary market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Outcome0,
    Outcome1,
}

impl Outcome {
    pub const ALL: [Outcome; 2] = [Outcome::Outcome0, Outcome::Outcome1];

    pub fn index(self) -> usize {
        match self {
            Outcome::Outcome0 => 0,
            Outcome::Outcome1 => 1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Outcome::Outcome0 => Outcome::Outcome1,
            Outcome::Outcome1 => Outcome::Outcome0,
        }
    }
}

impl TryFrom<u8> for Outcome {
    type Error = EscrowError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Outcome::Outcome0),
            1 => Ok(Outcome::Outcome1),
            other => Err(EscrowError::InvalidOutcome(other)),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option {}", self.index())
    }
}

/// Winner of a fixed-party escrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    PartyA,
    PartyB,
}

impl Winner {
    /// Settlement code as submitted by the arbiter: 0 pays party B, 1 pays party A.
    pub fn code(self) -> u8 {
        match self {
            Winner::PartyB => 0,
            Winner::PartyA => 1,
        }
    }
}

impl TryFrom<u8> for Winner {
    type Error = EscrowError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Winner::PartyB),
            1 => Ok(Winner::PartyA),
            other => Err(EscrowError::InvalidOutcome(other)),
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// Caller lacks the role required for the operation
    Unauthorized,
    InsufficientAllowance { required: Amount, granted: Amount },
    AlreadyDeposited,
    PartyANotDeposited,
    PartyBNotDeposited,
    EmptyPool(Outcome),
    AlreadySettled,
    InvalidOutcome(u8),
    InvalidConfig(String),
    TokenMismatch { expected: String, found: String },
    ArithmeticOverflow,
    Ledger(LedgerError),
}

impl EscrowError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            EscrowError::Unauthorized => "unauthorized",
            EscrowError::InsufficientAllowance { .. } => "insufficient_allowance",
            EscrowError::AlreadyDeposited => "already_deposited",
            EscrowError::PartyANotDeposited => "party_a_not_deposited",
            EscrowError::PartyBNotDeposited => "party_b_not_deposited",
            EscrowError::EmptyPool(_) => "empty_pool",
            EscrowError::AlreadySettled => "already_settled",
            EscrowError::InvalidOutcome(_) => "invalid_outcome",
            EscrowError::InvalidConfig(_) => "invalid_config",
            EscrowError::TokenMismatch { .. } => "token_mismatch",
            EscrowError::ArithmeticOverflow => "arithmetic_overflow",
            EscrowError::Ledger(_) => "ledger",
        }
    }
}

impl fmt::Display for EscrowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscrowError::Unauthorized => write!(f, "Caller is not authorized for this operation"),
            EscrowError::InsufficientAllowance { required, granted } => {
                write!(f, "Token is not allowed for deposit: allowance {}, stake {}", granted, required)
            }
            EscrowError::AlreadyDeposited => write!(f, "Deposit is allowed only one time"),
            EscrowError::PartyANotDeposited => write!(f, "Party A didn't make deposit yet"),
            EscrowError::PartyBNotDeposited => write!(f, "Party B didn't make deposit yet"),
            EscrowError::EmptyPool(outcome) => write!(f, "No users deposited on {}", outcome),
            EscrowError::AlreadySettled => write!(f, "Already settled"),
            EscrowError::InvalidOutcome(code) => write!(f, "Invalid outcome code: {}", code),
            EscrowError::InvalidConfig(msg) => write!(f, "Invalid escrow configuration: {}", msg),
            EscrowError::TokenMismatch { expected, found } => {
                write!(f, "Escrow holds {} but ledger tracks {}", expected, found)
            }
            EscrowError::ArithmeticOverflow => write!(f, "Arithmetic overflow"),
            EscrowError::Ledger(err) => write!(f, "Ledger error: {}", err),
        }
    }
}

impl std::error::Error for EscrowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EscrowError::Ledger(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LedgerError> for EscrowError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientAllowance { allowed, requested } => {
                EscrowError::InsufficientAllowance { required: requested, granted: allowed }
            }
            other => EscrowError::Ledger(other),
        }
    }
}

// ============================================================================
// SHARED GUARDS
// ============================================================================

fn ensure_token<L: TokenLedger + ?Sized>(ledger: &L, expected: &str) -> Result<(), EscrowError> {
    if ledger.token_id() != expected {
        return Err(EscrowError::TokenMismatch {
            expected: expected.to_string(),
            found: ledger.token_id().to_string(),
        });
    }
    Ok(())
}

fn ensure_stake(stake: Amount) -> Result<(), EscrowError> {
    if stake == 0 {
        return Err(EscrowError::InvalidConfig("stake must be positive".to_string()));
    }
    Ok(())
}
