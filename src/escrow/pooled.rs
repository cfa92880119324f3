//! Open binary-outcome market escrow.
//!
//! Any distinct participant deposits the fixed stake into one of two pools.
//! On settlement every member of the winning pool receives an equal share of
//! the losing pool's total:
//!
//! ```text
//! reward = losing_total / winner_count      (integer division)
//! ```
//!
//! Winners' own stakes and the division remainder are not paid out; they stay
//! in the escrow account and are reported as `residual`.

use super::{ensure_stake, ensure_token, EscrowError, Outcome};
use crate::ledger::{Address, Amount, TokenLedger};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PooledMarketConfig {
    pub owner: Address,
    pub account: Address,
    pub token: String,
    pub stake: Amount,
}

/// Depositors on one side plus the stake they put in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pool {
    pub members: Vec<Address>,
    pub total: Amount,
}

impl Pool {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Result of a successful settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub winning_outcome: Outcome,
    pub reward_per_winner: Amount,
    pub payouts: Vec<(Address, Amount)>,
    /// Escrow balance left after payouts
    pub residual: Amount,
}

/// Split `total` evenly across `count` recipients.
/// Returns `(share, remainder)`, or `None` when there is nobody to pay.
pub fn split_evenly(total: Amount, count: usize) -> Option<(Amount, Amount)> {
    let count = Amount::try_from(count).ok()?;
    let share = total.checked_div(count)?;
    Some((share, total % count))
}

#[derive(Debug, Clone)]
pub struct PooledMarketEscrow {
    config: PooledMarketConfig,
    pools: [Pool; 2],
    positions: HashMap<Address, Outcome>,
    settled: bool,
    winning_outcome: Option<Outcome>,
}

impl PooledMarketEscrow {
    pub fn new(config: PooledMarketConfig) -> Result<Self, EscrowError> {
        ensure_stake(config.stake)?;

        info!(account = %config.account.short(), stake = config.stake, "pooled market escrow deployed");

        Ok(Self {
            config,
            pools: [Pool::default(), Pool::default()],
            positions: HashMap::new(),
            settled: false,
            winning_outcome: None,
        })
    }

    pub fn config(&self) -> &PooledMarketConfig {
        &self.config
    }

    pub fn account(&self) -> &Address {
        &self.config.account
    }

    pub fn stake(&self) -> Amount {
        self.config.stake
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn winning_outcome(&self) -> Option<Outcome> {
        self.winning_outcome
    }

    pub fn pool(&self, outcome: Outcome) -> &Pool {
        &self.pools[outcome.index()]
    }

    /// Side a participant deposited on, if any
    pub fn position(&self, participant: &Address) -> Option<Outcome> {
        self.positions.get(participant).copied()
    }

    /// Pull the fixed stake from `caller` into the `outcome` pool.
    pub fn deposit<L: TokenLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &Address,
        outcome: Outcome,
    ) -> Result<(), EscrowError> {
        ensure_token(ledger, &self.config.token)?;

        // Balances are frozen once settled.
        if self.settled {
            return Err(EscrowError::AlreadySettled);
        }

        let stake = self.config.stake;
        let granted = ledger.allowance(caller, &self.config.account);
        if granted < stake {
            warn!(caller = %caller.short(), granted, "deposit rejected: allowance below stake");
            return Err(EscrowError::InsufficientAllowance { required: stake, granted });
        }

        if let Some(existing) = self.positions.get(caller) {
            warn!(caller = %caller.short(), existing = %existing, "deposit rejected: already deposited");
            return Err(EscrowError::AlreadyDeposited);
        }

        let new_total = self.pools[outcome.index()]
            .total
            .checked_add(stake)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        ledger.transfer_from(&self.config.account, caller, &self.config.account, stake)?;

        let pool = &mut self.pools[outcome.index()];
        pool.members.push(caller.clone());
        pool.total = new_total;
        self.positions.insert(caller.clone(), outcome);

        info!(caller = %caller.short(), outcome = %outcome, pool_total = new_total, "pooled deposit accepted");
        Ok(())
    }

    /// Per-winner reward `settle(outcome)` would pay with the current pools.
    pub fn projected_reward(&self, outcome: Outcome) -> Result<Amount, EscrowError> {
        self.ensure_both_sides()?;
        let winners = self.pool(outcome);
        let losers = self.pool(outcome.opposite());
        let (share, _) = split_evenly(losers.total, winners.len()).ok_or(EscrowError::EmptyPool(outcome))?;
        Ok(share)
    }

    /// Declare `outcome` the winning pool and pay its members.
    pub fn settle<L: TokenLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &Address,
        outcome: Outcome,
    ) -> Result<Settlement, EscrowError> {
        ensure_token(ledger, &self.config.token)?;

        if *caller != self.config.owner {
            warn!(caller = %caller.short(), "settle rejected: caller is not owner");
            return Err(EscrowError::Unauthorized);
        }
        if self.settled {
            return Err(EscrowError::AlreadySettled);
        }

        let reward = self.projected_reward(outcome)?;
        let payouts: Vec<(Address, Amount)> = self
            .pool(outcome)
            .members
            .iter()
            .map(|member| (member.clone(), reward))
            .collect();

        ledger.transfer_batch(&self.config.account, &payouts)?;

        self.settled = true;
        self.winning_outcome = Some(outcome);

        let residual = ledger.balance_of(&self.config.account);
        info!(
            outcome = %outcome,
            winners = payouts.len(),
            reward,
            residual,
            "pooled market escrow settled"
        );

        Ok(Settlement {
            winning_outcome: outcome,
            reward_per_winner: reward,
            payouts,
            residual,
        })
    }

    pub fn status<L: TokenLedger + ?Sized>(&self, ledger: &L) -> PooledMarketStatus {
        let projected_rewards = Outcome::ALL.map(|outcome| self.projected_reward(outcome).ok());
        PooledMarketStatus {
            account: self.config.account.clone(),
            owner: self.config.owner.clone(),
            token: self.config.token.clone(),
            stake: self.config.stake,
            pools: self.pools.clone(),
            projected_rewards,
            settled: self.settled,
            winning_outcome: self.winning_outcome,
            residual: self.settled.then(|| ledger.balance_of(&self.config.account)),
            balance: ledger.balance_of(&self.config.account),
        }
    }

    fn ensure_both_sides(&self) -> Result<(), EscrowError> {
        for outcome in Outcome::ALL {
            if self.pool(outcome).is_empty() {
                return Err(EscrowError::EmptyPool(outcome));
            }
        }
        Ok(())
    }
}

/// Snapshot of a pooled market escrow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PooledMarketStatus {
    pub account: Address,
    pub owner: Address,
    pub token: String,
    pub stake: Amount,
    /// Indexed by outcome
    pub pools: [Pool; 2],
    /// Reward per winner if that outcome were declared now
    pub projected_rewards: [Option<Amount>; 2],
    pub settled: bool,
    pub winning_outcome: Option<Outcome>,
    /// Balance left in the escrow after payouts; `None` until settled
    pub residual: Option<Amount>,
    pub balance: Amount,
}
