// Runtime configuration for the escrow service
//
// Values come from the process environment, after loading `.env` if present.
// Anything unset falls back to the defaults below.

use crate::ledger::Amount;
use std::fmt;
use std::net::SocketAddr;

/// sUSDC uses 18 decimals
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token in base units
pub const ONE_TOKEN: Amount = 10u128.pow(TOKEN_DECIMALS);

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:1234";
pub const DEFAULT_TOKEN_SYMBOL: &str = "sUSDC";
pub const DEFAULT_STAKE_AMOUNT: Amount = 200 * ONE_TOKEN;
pub const DEFAULT_GENESIS_BALANCE: Amount = 500 * ONE_TOKEN;
pub const DEFAULT_TOKEN_SUPPLY: Amount = 1_000_000_000 * ONE_TOKEN;

/// Master seed for deterministic demo accounts (NEVER use in production!)
pub const DEFAULT_GENESIS_SEED: &str = "BLACKBOOK_ESCROW_GENESIS_SEED_01";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "Invalid value for {}: {:?} ({})", key, value, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub token_symbol: String,
    /// Fixed stake for both escrows
    pub stake_amount: Amount,
    /// Balance handed to each demo participant at genesis
    pub genesis_balance: Amount,
    /// Minted to the owner before genesis transfers
    pub token_supply: Amount,
    pub genesis_seed: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 1234)),
            token_symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            stake_amount: DEFAULT_STAKE_AMOUNT,
            genesis_balance: DEFAULT_GENESIS_BALANCE,
            token_supply: DEFAULT_TOKEN_SUPPLY,
            genesis_seed: DEFAULT_GENESIS_SEED.to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env`, then read `ESCROW_*` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("ESCROW_BIND_ADDR") {
            config.bind_addr = value.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "ESCROW_BIND_ADDR",
                value: value.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(value) = lookup("ESCROW_TOKEN_SYMBOL") {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "ESCROW_TOKEN_SYMBOL",
                    value,
                    reason: "must not be empty".to_string(),
                });
            }
            config.token_symbol = value;
        }
        if let Some(value) = lookup("ESCROW_STAKE_AMOUNT") {
            config.stake_amount = parse_amount("ESCROW_STAKE_AMOUNT", &value)?;
        }
        if let Some(value) = lookup("ESCROW_GENESIS_BALANCE") {
            config.genesis_balance = parse_amount("ESCROW_GENESIS_BALANCE", &value)?;
        }
        if let Some(value) = lookup("ESCROW_TOKEN_SUPPLY") {
            config.token_supply = parse_amount("ESCROW_TOKEN_SUPPLY", &value)?;
        }
        if let Some(value) = lookup("ESCROW_GENESIS_SEED") {
            config.genesis_seed = value;
        }

        Ok(config)
    }
}

fn parse_amount(key: &'static str, value: &str) -> Result<Amount, ConfigError> {
    value.trim().replace('_', "").parse::<Amount>().map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
