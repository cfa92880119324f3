// Application state management

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::AppConfig;
use crate::escrow::{EscrowError, FixedPartyEscrow, PooledMarketEscrow};
use crate::genesis::{self, GenesisError};
use crate::ledger::{Address, InMemoryLedger};
use crate::models::ApiError;

/// Every request goes through this one lock, so escrow calls are totally ordered.
pub type SharedState = Arc<Mutex<AppState>>;

#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub ledger: InMemoryLedger,
    pub fixed: FixedPartyEscrow,
    pub pooled: PooledMarketEscrow,
    pub owner: Address,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, GenesisError> {
        let deployment = genesis::deploy(&config)?;
        Ok(Self {
            config,
            ledger: deployment.ledger,
            fixed: deployment.fixed,
            pooled: deployment.pooled,
            owner: deployment.owner,
        })
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// Resolve a registered name or known address
    pub fn resolve(&self, id: &str) -> Result<Address, ApiError> {
        self.ledger
            .resolve(id)
            .ok_or_else(|| ApiError::AccountNotFound(id.to_string()))
    }

    pub fn is_escrow_account(&self, address: &Address) -> bool {
        address == self.fixed.account() || address == self.pooled.account()
    }

    /// Escrow balances move only through deposit and settle.
    pub fn ensure_not_escrow(&self, address: &Address) -> Result<(), ApiError> {
        if self.is_escrow_account(address) {
            return Err(EscrowError::Unauthorized.into());
        }
        Ok(())
    }
}

pub fn lock_state(state: &SharedState) -> Result<MutexGuard<'_, AppState>, ApiError> {
    state
        .lock()
        .map_err(|_| ApiError::Internal("state lock poisoned".to_string()))
}
