/// Genesis deployment for the escrow service
///
/// Recreates the standard demo deployment:
/// - deterministic accounts derived from a master seed (OWNER + six participants)
/// - the owner mints the token supply and funds each participant
/// - a fixed-party escrow between ALICE and BOB
/// - an open pooled market escrow
///
/// All addresses derive from the seed, so they are stable across restarts.

use crate::config::AppConfig;
use crate::escrow::{EscrowError, FixedPartyConfig, FixedPartyEscrow, PooledMarketConfig, PooledMarketEscrow};
use crate::ledger::{Address, InMemoryLedger, LedgerError, TokenLedger};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::info;

// ============================================================================
// CONSTANTS
// ============================================================================

pub const OWNER_NAME: &str = "OWNER";

/// Funded demo participants. ALICE and BOB are the fixed-party escrow's parties.
pub const PARTICIPANT_NAMES: [&str; 6] = ["ALICE", "BOB", "CAROL", "DAVE", "ERIN", "FRANK"];

/// Ledger names of the two escrow accounts
pub const FIXED_ESCROW_NAME: &str = "FIXED";
pub const POOLED_ESCROW_NAME: &str = "POOLED";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum GenesisError {
    Ledger(LedgerError),
    Escrow(EscrowError),
}

impl fmt::Display for GenesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenesisError::Ledger(err) => write!(f, "Genesis ledger setup failed: {}", err),
            GenesisError::Escrow(err) => write!(f, "Genesis escrow deployment failed: {}", err),
        }
    }
}

impl std::error::Error for GenesisError {}

impl From<LedgerError> for GenesisError {
    fn from(err: LedgerError) -> Self {
        GenesisError::Ledger(err)
    }
}

impl From<EscrowError> for GenesisError {
    fn from(err: EscrowError) -> Self {
        GenesisError::Escrow(err)
    }
}

// ============================================================================
// DEPLOYMENT
// ============================================================================

/// Derive an account address: `L1_` + first 20 bytes of SHA256(seed || name), hex
pub fn derive_address(seed: &str, name: &str) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();
    Address::new(format!("L1_{}", hex::encode_upper(&digest[..20])))
}

#[derive(Debug)]
pub struct Deployment {
    pub ledger: InMemoryLedger,
    pub fixed: FixedPartyEscrow,
    pub pooled: PooledMarketEscrow,
    pub owner: Address,
}

pub fn deploy(config: &AppConfig) -> Result<Deployment, GenesisError> {
    let seed = config.genesis_seed.as_str();
    let mut ledger = InMemoryLedger::new(config.token_symbol.clone());

    let owner = derive_address(seed, OWNER_NAME);
    ledger.register(OWNER_NAME, &owner);
    ledger.mint(&owner, config.token_supply)?;

    let mut participants = Vec::with_capacity(PARTICIPANT_NAMES.len());
    for name in PARTICIPANT_NAMES {
        let address = derive_address(seed, name);
        ledger.register(name, &address);
        ledger.transfer(&owner, &address, config.genesis_balance)?;
        participants.push(address);
    }

    let fixed_account = derive_address(seed, FIXED_ESCROW_NAME);
    ledger.register(FIXED_ESCROW_NAME, &fixed_account);
    let fixed = FixedPartyEscrow::new(FixedPartyConfig {
        owner: owner.clone(),
        account: fixed_account,
        token: ledger.token_id().to_string(),
        stake: config.stake_amount,
        party_a: participants[0].clone(),
        party_b: participants[1].clone(),
    })?;

    let pooled_account = derive_address(seed, POOLED_ESCROW_NAME);
    ledger.register(POOLED_ESCROW_NAME, &pooled_account);
    let pooled = PooledMarketEscrow::new(PooledMarketConfig {
        owner: owner.clone(),
        account: pooled_account,
        token: ledger.token_id().to_string(),
        stake: config.stake_amount,
    })?;

    info!(
        owner = %owner.short(),
        participants = participants.len(),
        fixed = %fixed.account().short(),
        pooled = %pooled.account().short(),
        "genesis deployment complete"
    );

    Ok(Deployment { ledger, fixed, pooled, owner })
}
