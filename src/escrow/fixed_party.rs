//! Two-party, winner-take-all escrow.
//!
//! Exactly two designated parties each deposit the fixed stake once. The owner
//! later names one of them and the escrow's entire balance moves to that party.

use super::{ensure_stake, ensure_token, EscrowError, Winner};
use crate::ledger::{Address, Amount, TokenLedger};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Deployment-time configuration. Immutable once the escrow exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPartyConfig {
    /// Arbiter allowed to settle
    pub owner: Address,
    /// The escrow's own account on the token ledger
    pub account: Address,
    pub token: String,
    pub stake: Amount,
    pub party_a: Address,
    pub party_b: Address,
}

#[derive(Debug, Clone)]
pub struct FixedPartyEscrow {
    config: FixedPartyConfig,
    a_deposited: bool,
    b_deposited: bool,
    settled: bool,
    winner: Option<Winner>,
}

impl FixedPartyEscrow {
    pub fn new(config: FixedPartyConfig) -> Result<Self, EscrowError> {
        ensure_stake(config.stake)?;
        if config.party_a == config.party_b {
            return Err(EscrowError::InvalidConfig("parties must be distinct".to_string()));
        }

        info!(
            account = %config.account.short(),
            party_a = %config.party_a.short(),
            party_b = %config.party_b.short(),
            stake = config.stake,
            "fixed-party escrow deployed"
        );

        Ok(Self {
            config,
            a_deposited: false,
            b_deposited: false,
            settled: false,
            winner: None,
        })
    }

    pub fn config(&self) -> &FixedPartyConfig {
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

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn has_deposited(&self, participant: &Address) -> bool {
        if *participant == self.config.party_a {
            self.a_deposited
        } else if *participant == self.config.party_b {
            self.b_deposited
        } else {
            false
        }
    }

    pub fn party(&self, winner: Winner) -> &Address {
        match winner {
            Winner::PartyA => &self.config.party_a,
            Winner::PartyB => &self.config.party_b,
        }
    }

    /// Pull the fixed stake from `caller`, who must be one of the two parties.
    pub fn deposit<L: TokenLedger + ?Sized>(&mut self, ledger: &mut L, caller: &Address) -> Result<(), EscrowError> {
        ensure_token(ledger, &self.config.token)?;

        let is_party_a = *caller == self.config.party_a;
        if !is_party_a && *caller != self.config.party_b {
            warn!(caller = %caller.short(), "deposit rejected: not a designated party");
            return Err(EscrowError::Unauthorized);
        }

        let granted = ledger.allowance(caller, &self.config.account);
        if granted < self.config.stake {
            warn!(caller = %caller.short(), granted, "deposit rejected: allowance below stake");
            return Err(EscrowError::InsufficientAllowance { required: self.config.stake, granted });
        }

        let already = if is_party_a { self.a_deposited } else { self.b_deposited };
        if already {
            warn!(caller = %caller.short(), "deposit rejected: already deposited");
            return Err(EscrowError::AlreadyDeposited);
        }

        ledger.transfer_from(&self.config.account, caller, &self.config.account, self.config.stake)?;

        if is_party_a {
            self.a_deposited = true;
        } else {
            self.b_deposited = true;
        }

        info!(caller = %caller.short(), stake = self.config.stake, "fixed-party deposit accepted");
        Ok(())
    }

    /// Pay the whole escrow balance to the chosen party. Returns the amount paid.
    pub fn settle<L: TokenLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &Address,
        winner: Winner,
    ) -> Result<Amount, EscrowError> {
        ensure_token(ledger, &self.config.token)?;

        if *caller != self.config.owner {
            warn!(caller = %caller.short(), "settle rejected: caller is not owner");
            return Err(EscrowError::Unauthorized);
        }
        if !self.a_deposited {
            return Err(EscrowError::PartyANotDeposited);
        }
        if !self.b_deposited {
            return Err(EscrowError::PartyBNotDeposited);
        }
        if self.settled {
            return Err(EscrowError::AlreadySettled);
        }

        let payee = self.party(winner).clone();
        let pot = ledger.balance_of(&self.config.account);
        ledger.transfer(&self.config.account, &payee, pot)?;

        self.settled = true;
        self.winner = Some(winner);

        info!(winner = ?winner, payee = %payee.short(), pot, "fixed-party escrow settled");
        Ok(pot)
    }

    pub fn status<L: TokenLedger + ?Sized>(&self, ledger: &L) -> FixedPartyStatus {
        FixedPartyStatus {
            account: self.config.account.clone(),
            owner: self.config.owner.clone(),
            token: self.config.token.clone(),
            stake: self.config.stake,
            party_a: PartyStatus {
                address: self.config.party_a.clone(),
                deposited: self.a_deposited,
            },
            party_b: PartyStatus {
                address: self.config.party_b.clone(),
                deposited: self.b_deposited,
            },
            settled: self.settled,
            winner: self.winner,
            balance: ledger.balance_of(&self.config.account),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyStatus {
    pub address: Address,
    pub deposited: bool,
}

/// Snapshot of a fixed-party escrow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPartyStatus {
    pub account: Address,
    pub owner: Address,
    pub token: String,
    pub stake: Amount,
    pub party_a: PartyStatus,
    pub party_b: PartyStatus,
    pub settled: bool,
    pub winner: Option<Winner>,
    pub balance: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;

    fn config() -> FixedPartyConfig {
        FixedPartyConfig {
            owner: Address::from("OWNER"),
            account: Address::from("ESCROW"),
            token: "sUSDC".to_string(),
            stake: 200,
            party_a: Address::from("ALICE"),
            party_b: Address::from("BOB"),
        }
    }

    #[test]
    fn test_rejects_identical_parties() {
        let mut cfg = config();
        cfg.party_b = cfg.party_a.clone();
        assert!(matches!(FixedPartyEscrow::new(cfg), Err(EscrowError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_stake() {
        let mut cfg = config();
        cfg.stake = 0;
        assert!(matches!(FixedPartyEscrow::new(cfg), Err(EscrowError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_foreign_token() {
        let mut escrow = FixedPartyEscrow::new(config()).unwrap();
        let mut ledger = InMemoryLedger::new("OTHER");
        let err = escrow.deposit(&mut ledger, &Address::from("ALICE")).unwrap_err();
        assert_eq!(err.kind(), "token_mismatch");
    }

    #[test]
    fn test_failed_pull_leaves_flag_unset() {
        let mut escrow = FixedPartyEscrow::new(config()).unwrap();
        let mut ledger = InMemoryLedger::new("sUSDC");
        let alice = Address::from("ALICE");
        // Allowance granted but no balance to pull from.
        ledger.approve(&alice, escrow.account(), 200);

        let err = escrow.deposit(&mut ledger, &alice).unwrap_err();
        assert!(matches!(err, EscrowError::Ledger(_)));
        assert!(!escrow.has_deposited(&alice));
        assert_eq!(ledger.balance_of(escrow.account()), 0);
    }
}
