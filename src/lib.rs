/// BlackBook Escrow - Wager Custody & Settlement
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod config;
pub mod escrow;
pub mod genesis;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use config::{AppConfig, ConfigError, ONE_TOKEN};
pub use escrow::{
    EscrowError, Outcome, Winner,
    FixedPartyConfig, FixedPartyEscrow, FixedPartyStatus, PartyStatus,
    PooledMarketConfig, PooledMarketEscrow, PooledMarketStatus, Pool, Settlement, split_evenly,
};
pub use genesis::{Deployment, GenesisError, derive_address, deploy};
pub use ledger::{Address, Amount, InMemoryLedger, LedgerError, LedgerStats, TokenLedger, Transaction, TxType};
pub use models::ApiError;
pub use routes::build_router;
