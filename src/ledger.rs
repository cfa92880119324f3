/// Token Ledger for BlackBook Escrow
///
/// The escrow engines never own balances. They consume a `TokenLedger`
/// capability that can:
/// - pull a stake from a depositor (bounded by the allowance it granted)
/// - push escrowed balance out to a payee
/// - report balances and allowances
///
/// `InMemoryLedger` is the adapter used by the service and the tests. It keeps
/// ERC-20 style balances and allowances plus an append-only transaction log.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Token amount in base units (18 decimals for the default sUSDC token)
pub type Amount = u128;

/// Opaque account identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Address(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 characters, for log lines
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(16)
            .map_or(&self.0[..], |(end, _)| &self.0[..end])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Address(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Address(value)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    InsufficientBalance { available: Amount, requested: Amount },
    InsufficientAllowance { allowed: Amount, requested: Amount },
    ArithmeticOverflow,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InsufficientBalance { available, requested } => {
                write!(f, "Insufficient balance: have {}, need {}", available, requested)
            }
            LedgerError::InsufficientAllowance { allowed, requested } => {
                write!(f, "Insufficient allowance: allowed {}, need {}", allowed, requested)
            }
            LedgerError::ArithmeticOverflow => write!(f, "Arithmetic overflow"),
        }
    }
}

impl std::error::Error for LedgerError {}

// ============================================================================
// TOKEN LEDGER CAPABILITY
// ============================================================================

/// Fungible token ledger consumed by the escrow engines.
///
/// Every mutating method is all-or-nothing: on `Err` no balance or allowance
/// has changed.
pub trait TokenLedger {
    /// Identity of the token this ledger tracks
    fn token_id(&self) -> &str;

    fn balance_of(&self, account: &Address) -> Amount;

    /// Amount `spender` may still pull from `owner`
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Move `amount` from `from` to `to`. Never moves more than `from` holds.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Pull `amount` from `owner` into `recipient` on behalf of `spender`,
    /// consuming the same amount of owner -> spender allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Several transfers out of one account, applied together or not at all.
    fn transfer_batch(&mut self, from: &Address, payouts: &[(Address, Amount)]) -> Result<(), LedgerError>;
}

// ============================================================================
// TRANSACTION LOG
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxType {
    AccountCreated,
    Mint,
    Approve,
    Transfer,
    TransferFrom,
}

/// A single ledger movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub tx_type: TxType,
    pub from: Option<Address>,
    pub to: Option<Address>,
    /// Set for allowance-based pulls and approvals
    #[serde(default)]
    pub spender: Option<Address>,
    pub amount: Amount,
    pub block_number: u64,
    pub timestamp: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Transaction {
    fn new(tx_type: TxType, amount: Amount) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tx_type,
            from: None,
            to: None,
            spender: None,
            amount,
            block_number: 0,
            timestamp: chrono::Utc::now().timestamp(),
            description: None,
        }
    }

    pub fn account_created(name: &str, address: &Address) -> Self {
        let mut tx = Self::new(TxType::AccountCreated, 0);
        tx.to = Some(address.clone());
        tx.description = Some(format!("Account {} registered", name));
        tx
    }

    pub fn mint(to: &Address, amount: Amount) -> Self {
        let mut tx = Self::new(TxType::Mint, amount);
        tx.to = Some(to.clone());
        tx.description = Some(format!("Minted {} to {}", amount, to.short()));
        tx
    }

    pub fn approve(owner: &Address, spender: &Address, allowance: Amount) -> Self {
        let mut tx = Self::new(TxType::Approve, allowance);
        tx.from = Some(owner.clone());
        tx.spender = Some(spender.clone());
        tx.description = Some(format!("Allowance for {} set to {}", spender.short(), allowance));
        tx
    }

    pub fn transfer(from: &Address, to: &Address, amount: Amount) -> Self {
        let mut tx = Self::new(TxType::Transfer, amount);
        tx.from = Some(from.clone());
        tx.to = Some(to.clone());
        tx.description = Some(format!("Transfer {}", amount));
        tx
    }

    pub fn transfer_from(spender: &Address, owner: &Address, to: &Address, amount: Amount) -> Self {
        let mut tx = Self::new(TxType::TransferFrom, amount);
        tx.from = Some(owner.clone());
        tx.to = Some(to.clone());
        tx.spender = Some(spender.clone());
        tx.description = Some(format!("Pulled {} by {}", amount, spender.short()));
        tx
    }

    pub fn involves(&self, address: &Address) -> bool {
        self.from.as_ref() == Some(address)
            || self.to.as_ref() == Some(address)
            || self.spender.as_ref() == Some(address)
    }
}

// ============================================================================
// IN-MEMORY LEDGER
// ============================================================================

#[derive(Debug)]
pub struct InMemoryLedger {
    token: String,
    /// Account balances (address -> amount)
    balances: HashMap<Address, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), Amount>,
    /// NAME -> address
    accounts: HashMap<String, Address>,
    transactions: Vec<Transaction>,
    total_supply: Amount,
    block: u64,
}

impl InMemoryLedger {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        info!(token = %token, "token ledger initialized");
        Self {
            token,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            accounts: HashMap::new(),
            transactions: Vec::new(),
            total_supply: 0,
            block: 0,
        }
    }

    /// Register a display name for an address. The address starts at zero balance.
    pub fn register(&mut self, name: &str, address: &Address) {
        self.accounts.insert(name.to_uppercase(), address.clone());
        self.balances.entry(address.clone()).or_insert(0);
        self.record(Transaction::account_created(name, address));
        debug!(name, address = %address.short(), "account registered");
    }

    /// Resolve a registered name or a known address
    pub fn resolve(&self, id: &str) -> Option<Address> {
        if let Some(addr) = self.accounts.get(&id.to_uppercase()) {
            return Some(addr.clone());
        }
        let candidate = Address::from(id);
        if self.balances.contains_key(&candidate) {
            return Some(candidate);
        }
        None
    }

    /// Registered accounts sorted by name
    pub fn named_accounts(&self) -> Vec<(String, Address)> {
        let mut named: Vec<(String, Address)> = self.accounts
            .iter()
            .map(|(name, addr)| (name.clone(), addr.clone()))
            .collect();
        named.sort();
        named
    }

    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<Amount, LedgerError> {
        let supply = self.total_supply.checked_add(amount).ok_or(LedgerError::ArithmeticOverflow)?;
        let balance = self.balance_of(to).checked_add(amount).ok_or(LedgerError::ArithmeticOverflow)?;
        self.total_supply = supply;
        self.balances.insert(to.clone(), balance);
        self.record(Transaction::mint(to, amount));
        info!(to = %to.short(), amount, "minted");
        Ok(balance)
    }

    /// Overwrite the owner -> spender allowance
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances.insert((owner.clone(), spender.clone()), amount);
        self.record(Transaction::approve(owner, spender, amount));
        debug!(owner = %owner.short(), spender = %spender.short(), amount, "allowance set");
    }

    /// Add to the owner -> spender allowance, returning the new allowance
    pub fn increase_allowance(&mut self, owner: &Address, spender: &Address, added: Amount) -> Result<Amount, LedgerError> {
        let allowance = self.allowance(owner, spender)
            .checked_add(added)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.approve(owner, spender, allowance);
        Ok(allowance)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn get_transactions(&self, address: &Address) -> Vec<&Transaction> {
        self.transactions.iter().filter(|tx| tx.involves(address)).collect()
    }

    pub fn recent_transactions(&self, limit: usize) -> Vec<&Transaction> {
        self.transactions.iter().rev().take(limit).collect()
    }

    pub fn stats(&self) -> LedgerStats {
        let transfer_volume = self.transactions
            .iter()
            .filter(|tx| matches!(tx.tx_type, TxType::Transfer | TxType::TransferFrom))
            .fold(0u128, |acc, tx| acc.saturating_add(tx.amount));

        LedgerStats {
            token: self.token.clone(),
            accounts: self.balances.len(),
            transactions: self.transactions.len(),
            block: self.block,
            total_supply: self.total_supply,
            transfer_volume,
        }
    }

    fn record(&mut self, mut tx: Transaction) {
        self.block += 1;
        tx.block_number = self.block;
        self.transactions.push(tx);
    }

    /// Compute post-transfer balances for every touched account without
    /// writing anything.
    fn stage_transfers(&self, from: &Address, payouts: &[(Address, Amount)]) -> Result<HashMap<Address, Amount>, LedgerError> {
        let mut staged: HashMap<Address, Amount> = HashMap::new();
        staged.insert(from.clone(), self.balance_of(from));

        for (to, amount) in payouts {
            let available = staged.get(from).copied().unwrap_or(0);
            let remaining = available.checked_sub(*amount).ok_or(LedgerError::InsufficientBalance {
                available,
                requested: *amount,
            })?;
            staged.insert(from.clone(), remaining);

            let current = match staged.get(to) {
                Some(balance) => *balance,
                None => self.balance_of(to),
            };
            let credited = current.checked_add(*amount).ok_or(LedgerError::ArithmeticOverflow)?;
            staged.insert(to.clone(), credited);
        }

        Ok(staged)
    }

    fn commit(&mut self, staged: HashMap<Address, Amount>) {
        for (address, balance) in staged {
            self.balances.insert(address, balance);
        }
    }
}

impl TokenLedger for InMemoryLedger {
    fn token_id(&self) -> &str {
        &self.token
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        let staged = self.stage_transfers(from, &[(to.clone(), amount)])?;
        self.commit(staged);
        self.record(Transaction::transfer(from, to, amount));
        info!(from = %from.short(), to = %to.short(), amount, "transfer");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(owner, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance { allowed, requested: amount });
        }

        let staged = self.stage_transfers(owner, &[(recipient.clone(), amount)])?;
        self.commit(staged);
        self.allowances.insert((owner.clone(), spender.clone()), allowed - amount);
        self.record(Transaction::transfer_from(spender, owner, recipient, amount));
        info!(owner = %owner.short(), recipient = %recipient.short(), amount, "transfer_from");
        Ok(())
    }

    fn transfer_batch(&mut self, from: &Address, payouts: &[(Address, Amount)]) -> Result<(), LedgerError> {
        let staged = self.stage_transfers(from, payouts)?;
        self.commit(staged);
        for (to, amount) in payouts {
            self.record(Transaction::transfer(from, to, *amount));
        }
        info!(from = %from.short(), payees = payouts.len(), "batch transfer");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStats {
    pub token: String,
    pub accounts: usize,
    pub transactions: usize,
    pub block: u64,
    pub total_supply: Amount,
    pub transfer_volume: Amount,
}
