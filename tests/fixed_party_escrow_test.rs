/// Fixed-party escrow behavior against the in-memory token ledger
///
/// ALICE and BOB are the designated parties, OWNER is the arbiter,
/// MALLORY is an outsider.

use blackbook_escrow::{
    Address, Amount, EscrowError, FixedPartyConfig, FixedPartyEscrow, InMemoryLedger, TokenLedger, Winner,
};

const STAKE: Amount = 200;
const GENESIS: Amount = 500;

// ============================================================================
// HELPERS
// ============================================================================

struct Fixture {
    ledger: InMemoryLedger,
    escrow: FixedPartyEscrow,
    owner: Address,
    alice: Address,
    bob: Address,
    mallory: Address,
}

fn setup() -> Fixture {
    let owner = Address::from("L1_OWNER");
    let alice = Address::from("L1_ALICE");
    let bob = Address::from("L1_BOB");
    let mallory = Address::from("L1_MALLORY");

    let mut ledger = InMemoryLedger::new("sUSDC");
    ledger.mint(&owner, 10_000).unwrap();

    let escrow = FixedPartyEscrow::new(FixedPartyConfig {
        owner: owner.clone(),
        account: Address::from("L1_FIXED_ESCROW"),
        token: "sUSDC".to_string(),
        stake: STAKE,
        party_a: alice.clone(),
        party_b: bob.clone(),
    })
    .unwrap();

    Fixture { ledger, escrow, owner, alice, bob, mallory }
}

fn fund(f: &mut Fixture) {
    for who in [f.alice.clone(), f.bob.clone(), f.mallory.clone()] {
        f.ledger.transfer(&f.owner, &who, GENESIS).unwrap();
    }
}

fn approve_and_deposit(f: &mut Fixture, who: &Address) -> Result<(), EscrowError> {
    let account = f.escrow.account().clone();
    f.ledger.increase_allowance(who, &account, STAKE).unwrap();
    f.escrow.deposit(&mut f.ledger, who)
}

fn escrow_balance(f: &Fixture) -> Amount {
    f.ledger.balance_of(f.escrow.account())
}

// ============================================================================
// DEPOSITS
// ============================================================================

#[test]
fn test_only_designated_parties_can_deposit() {
    let mut f = setup();
    fund(&mut f);

    let mallory = f.mallory.clone();
    assert_eq!(approve_and_deposit(&mut f, &mallory), Err(EscrowError::Unauthorized));

    let owner = f.owner.clone();
    assert_eq!(approve_and_deposit(&mut f, &owner), Err(EscrowError::Unauthorized));
    assert_eq!(escrow_balance(&f), 0);
}

#[test]
fn test_deposit_requires_allowance() {
    let mut f = setup();
    fund(&mut f);

    let alice = f.alice.clone();
    let err = f.escrow.deposit(&mut f.ledger, &alice).unwrap_err();
    assert_eq!(err, EscrowError::InsufficientAllowance { required: STAKE, granted: 0 });

    let account = f.escrow.account().clone();
    f.ledger.increase_allowance(&alice, &account, STAKE - 1).unwrap();
    let err = f.escrow.deposit(&mut f.ledger, &alice).unwrap_err();
    assert_eq!(err, EscrowError::InsufficientAllowance { required: STAKE, granted: STAKE - 1 });

    assert!(!f.escrow.has_deposited(&alice));
    assert_eq!(f.ledger.balance_of(&alice), GENESIS);
}

#[test]
fn test_deposit_after_allowance_moves_stake() {
    let mut f = setup();
    fund(&mut f);

    let alice = f.alice.clone();
    approve_and_deposit(&mut f, &alice).unwrap();

    assert_eq!(escrow_balance(&f), STAKE);
    assert_eq!(f.ledger.balance_of(&alice), GENESIS - STAKE);
    assert!(f.escrow.has_deposited(&alice));
    assert_eq!(f.ledger.allowance(&alice, f.escrow.account()), 0);
}

#[test]
fn test_double_deposit_rejected() {
    let mut f = setup();
    fund(&mut f);

    let alice = f.alice.clone();
    approve_and_deposit(&mut f, &alice).unwrap();
    assert_eq!(approve_and_deposit(&mut f, &alice), Err(EscrowError::AlreadyDeposited));

    // First deposit is not duplicated.
    assert_eq!(escrow_balance(&f), STAKE);
    assert_eq!(f.ledger.balance_of(&alice), GENESIS - STAKE);
}

#[test]
fn test_both_parties_deposit() {
    let mut f = setup();
    fund(&mut f);

    let (alice, bob) = (f.alice.clone(), f.bob.clone());
    approve_and_deposit(&mut f, &alice).unwrap();
    approve_and_deposit(&mut f, &bob).unwrap();

    assert_eq!(escrow_balance(&f), STAKE * 2);
}

// ============================================================================
// SETTLEMENT
// ============================================================================

#[test]
fn test_only_owner_can_settle() {
    let mut f = setup();
    fund(&mut f);
    let (alice, bob) = (f.alice.clone(), f.bob.clone());
    approve_and_deposit(&mut f, &alice).unwrap();
    approve_and_deposit(&mut f, &bob).unwrap();

    let err = f.escrow.settle(&mut f.ledger, &alice, Winner::PartyA).unwrap_err();
    assert_eq!(err, EscrowError::Unauthorized);
    assert!(!f.escrow.is_settled());
    assert_eq!(escrow_balance(&f), STAKE * 2);
}

#[test]
fn test_settle_requires_both_deposits_in_order() {
    let mut f = setup();
    fund(&mut f);
    let owner = f.owner.clone();

    let err = f.escrow.settle(&mut f.ledger, &owner, Winner::PartyB).unwrap_err();
    assert_eq!(err, EscrowError::PartyANotDeposited);

    let bob = f.bob.clone();
    approve_and_deposit(&mut f, &bob).unwrap();
    // A is still checked first.
    let err = f.escrow.settle(&mut f.ledger, &owner, Winner::PartyB).unwrap_err();
    assert_eq!(err, EscrowError::PartyANotDeposited);

    let alice = f.alice.clone();
    approve_and_deposit(&mut f, &alice).unwrap();
    f.escrow.settle(&mut f.ledger, &owner, Winner::PartyB).unwrap();
    assert!(f.escrow.is_settled());
}

#[test]
fn test_settle_reports_missing_party_b() {
    let mut f = setup();
    fund(&mut f);
    let (owner, alice) = (f.owner.clone(), f.alice.clone());
    approve_and_deposit(&mut f, &alice).unwrap();

    let err = f.escrow.settle(&mut f.ledger, &owner, Winner::PartyA).unwrap_err();
    assert_eq!(err, EscrowError::PartyBNotDeposited);
    assert!(!f.escrow.is_settled());
}

#[test]
fn test_code_zero_pays_party_b_everything() {
    let mut f = setup();
    fund(&mut f);
    let (owner, alice, bob) = (f.owner.clone(), f.alice.clone(), f.bob.clone());
    approve_and_deposit(&mut f, &alice).unwrap();
    approve_and_deposit(&mut f, &bob).unwrap();

    let bob_before = f.ledger.balance_of(&bob);
    let pot_before = escrow_balance(&f);
    let winner = Winner::try_from(0).unwrap();
    let paid = f.escrow.settle(&mut f.ledger, &owner, winner).unwrap();

    assert_eq!(paid, pot_before);
    assert_eq!(escrow_balance(&f), 0);
    assert_eq!(f.ledger.balance_of(&bob), bob_before + pot_before);
    assert_eq!(f.ledger.balance_of(&alice), GENESIS - STAKE);
    assert_eq!(f.escrow.winner(), Some(Winner::PartyB));
}

#[test]
fn test_code_one_pays_party_a_everything() {
    let mut f = setup();
    fund(&mut f);
    let (owner, alice, bob) = (f.owner.clone(), f.alice.clone(), f.bob.clone());
    approve_and_deposit(&mut f, &alice).unwrap();
    approve_and_deposit(&mut f, &bob).unwrap();

    f.escrow.settle(&mut f.ledger, &owner, Winner::try_from(1).unwrap()).unwrap();

    assert_eq!(f.ledger.balance_of(&alice), GENESIS + STAKE);
    assert_eq!(f.ledger.balance_of(&bob), GENESIS - STAKE);
    assert_eq!(escrow_balance(&f), 0);
}

#[test]
fn test_cannot_settle_twice() {
    let mut f = setup();
    fund(&mut f);
    let (owner, alice, bob) = (f.owner.clone(), f.alice.clone(), f.bob.clone());
    approve_and_deposit(&mut f, &alice).unwrap();
    approve_and_deposit(&mut f, &bob).unwrap();
    f.escrow.settle(&mut f.ledger, &owner, Winner::PartyB).unwrap();

    // Extra funds sent to the escrow after settlement stay put.
    let account = f.escrow.account().clone();
    f.ledger.transfer(&owner, &account, 50).unwrap();

    for winner in [Winner::PartyA, Winner::PartyB] {
        let err = f.escrow.settle(&mut f.ledger, &owner, winner).unwrap_err();
        assert_eq!(err, EscrowError::AlreadySettled);
    }
    assert_eq!(escrow_balance(&f), 50);
    assert!(f.escrow.is_settled());
}

#[test]
fn test_no_deposit_changes_balance_after_settlement() {
    let mut f = setup();
    fund(&mut f);
    let (owner, alice, bob) = (f.owner.clone(), f.alice.clone(), f.bob.clone());
    approve_and_deposit(&mut f, &alice).unwrap();
    approve_and_deposit(&mut f, &bob).unwrap();
    f.escrow.settle(&mut f.ledger, &owner, Winner::PartyA).unwrap();

    assert_eq!(approve_and_deposit(&mut f, &alice), Err(EscrowError::AlreadyDeposited));
    assert_eq!(approve_and_deposit(&mut f, &bob), Err(EscrowError::AlreadyDeposited));
    assert_eq!(escrow_balance(&f), 0);
}

#[test]
fn test_status_snapshot() {
    let mut f = setup();
    fund(&mut f);
    let alice = f.alice.clone();
    approve_and_deposit(&mut f, &alice).unwrap();

    let status = f.escrow.status(&f.ledger);
    assert!(status.party_a.deposited);
    assert!(!status.party_b.deposited);
    assert_eq!(status.balance, STAKE);
    assert!(!status.settled);
    assert_eq!(status.winner, None);
}
