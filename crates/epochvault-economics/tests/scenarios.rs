// crates/epochvault-economics/tests/scenarios.rs
//
// End-to-end vault scenarios against the in-memory host.
//
// Each test drives the public `Vault` API through a sequence of calls at
// explicit timestamps and checks ledger balances, epoch records, and the
// redemption book afterwards.

use epochvault_core::crypto::{merkle_proof, merkle_root, reward_leaf};
use epochvault_core::receipt::{FuturesKind, ReceiptKind};
use epochvault_core::traits::{BalanceLedger, FeeClass, FeeSink, Host, FUNGIBLE};
use epochvault_core::{Address, AssetId, VaultError};
use epochvault_economics::{
    mul_div, CallContext, RewardClaim, Vault, VaultConfig, DEFAULT_EPOCH_DURATION, UNIT,
};
use epochvault_store::MemoryHost;

const D: u64 = DEFAULT_EPOCH_DURATION;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Vault with D = two weeks, an 8-epoch fee horizon, and 10-epoch locks.
fn vault() -> Vault<MemoryHost> {
    let config = VaultConfig {
        epoch_duration: D,
        max_redemption_time: 8 * D,
        lock_duration: 10 * D,
        ..VaultConfig::default()
    };
    let host = MemoryHost::new(config.epoch_duration, config.lock_duration);
    Vault::new(config, host).unwrap()
}

fn at(label: &str, now: u64) -> CallContext {
    CallContext::new(Address::from_label(label), now)
}

fn addr(label: &str) -> Address {
    Address::from_label(label)
}

fn reward_token() -> AssetId {
    addr("reward-token")
}

/// Mint underlying to `label` and deposit it at `now`.
fn deposit(vault: &mut Vault<MemoryHost>, label: &str, amount: u128, now: u64) {
    let account = addr(label);
    let underlying = vault.config().underlying_asset;
    vault
        .host_mut()
        .assets_mut()
        .mint(&account, underlying, amount)
        .unwrap();
    vault
        .deposit(at(label, now), amount, account, None)
        .unwrap();
}

/// Publish a one-leaf reward root paying `amount` of `asset` to the vault.
fn publish_reward(vault: &mut Vault<MemoryHost>, asset: AssetId, index: u64, amount: u128) -> RewardClaim {
    let custody = vault.config().custody;
    let leaves = vec![reward_leaf(index, &custody, amount)];
    let root = merkle_root(&leaves);
    let proof = merkle_proof(&leaves, 0).unwrap();
    vault.host_mut().reward_source().publish_root(asset, root);
    RewardClaim {
        asset,
        index,
        amount,
        proof,
    }
}

// ---------------------------------------------------------------------------
// Redemptions
// ---------------------------------------------------------------------------

#[test]
fn test_redemption_fee_and_futures_at_four_epochs_remaining() {
    let mut v = vault();
    deposit(&mut v, "alice", UNIT, 0);
    let alice = addr("alice");

    // Lock unlocks at 10D; at 6D there are 4D remaining.
    let quotes = v
        .initiate_redemptions(at("alice", 6 * D), &[0], FuturesKind::Reward, &[UNIT], alice)
        .unwrap();

    let quote = quotes[0];
    assert_eq!(quote.unlock_time, 10 * D);
    assert_eq!(quote.fee_percent, 30_000);
    assert_eq!(quote.fee, 3 * UNIT / 100);
    assert_eq!(quote.post_fee, 97 * UNIT / 100);
    assert_eq!(quote.rounds, 4);

    let futures = ReceiptKind::Futures(FuturesKind::Reward);
    for epoch in [7 * D, 8 * D, 9 * D, 10 * D] {
        assert_eq!(v.receipt_balance(futures, &alice, epoch), 97 * UNIT / 100);
    }
    assert_eq!(v.receipt_balance(futures, &alice, 6 * D), 0);
    assert_eq!(v.receipt_balance(futures, &alice, 11 * D), 0);
    assert_eq!(
        v.receipt_balance(ReceiptKind::DeferredClaim, &alice, 10 * D),
        97 * UNIT / 100
    );
    assert_eq!(v.redemptions(10 * D), 97 * UNIT / 100);
    assert_eq!(v.outstanding_redemptions(), 97 * UNIT / 100);

    let sink = v.host().fee_sink().account();
    assert_eq!(v.primary_balance(&alice), 0);
    assert_eq!(v.primary_balance(&sink), 3 * UNIT / 100);
    assert_eq!(
        v.host()
            .fee_sink()
            .collected(FeeClass::Redemption, &v.config().primary_asset),
        3 * UNIT / 100
    );
}

#[test]
fn test_redeem_after_unlock_pays_underlying_and_relocks_rest() {
    let mut v = vault();
    deposit(&mut v, "alice", UNIT, 0);
    let alice = addr("alice");
    let bob = addr("bob");
    let underlying = v.config().underlying_asset;

    v.initiate_redemptions(at("alice", 6 * D), &[0], FuturesKind::Vote, &[UNIT], alice)
        .unwrap();
    let post_fee = v.outstanding_redemptions();

    assert_eq!(
        v.redeem(at("alice", 10 * D - 1), &[10 * D], &[post_fee], bob),
        Err(VaultError::BeforeLockExpiry {
            unlock_time: 10 * D,
            now: 10 * D - 1
        })
    );

    let paid = v
        .redeem(at("alice", 10 * D), &[10 * D], &[post_fee], bob)
        .unwrap();

    assert_eq!(paid, post_fee);
    assert_eq!(v.host().assets().balance_of(&bob, underlying), post_fee);
    assert_eq!(v.outstanding_redemptions(), 0);
    assert_eq!(v.receipt_supply(ReceiptKind::DeferredClaim, 10 * D), 0);
    // The unreserved remainder goes straight back into a new lock.
    assert_eq!(v.locked_balance(), UNIT - post_fee);
    assert_eq!(v.custody_balance(), 0);
}

#[test]
fn test_redemption_allowance_failure_rolls_back_whole_batch() {
    let mut v = vault();
    deposit(&mut v, "alice", UNIT, 0);
    deposit(&mut v, "bob", UNIT, D / 2);
    let alice = addr("alice");

    // Both deposits land in the same lock: 2 tokens unlocking at 10D. After
    // the first entry only 1.03 remains for the second.
    let events_before = v.events().len();
    let err = v
        .initiate_redemptions(
            at("alice", 6 * D),
            &[0, 0],
            FuturesKind::Vote,
            &[UNIT, UNIT + UNIT / 10],
            alice,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        VaultError::InsufficientRedemptionAllowance { unlock_time, .. } if unlock_time == 10 * D
    ));
    assert_eq!(v.primary_balance(&alice), UNIT);
    assert_eq!(v.outstanding_redemptions(), 0);
    assert_eq!(v.receipt_supply(ReceiptKind::DeferredClaim, 10 * D), 0);
    assert_eq!(
        v.receipt_supply(ReceiptKind::Futures(FuturesKind::Vote), 7 * D),
        0
    );
    assert_eq!(v.events().len(), events_before);
}

#[test]
fn test_redemption_allowance_query_tracks_outstanding() {
    let mut v = vault();
    deposit(&mut v, "alice", UNIT, 0);
    let alice = addr("alice");

    assert_eq!(v.redemption_allowance(0, 6 * D), Ok(UNIT));
    v.initiate_redemptions(at("alice", 6 * D), &[0], FuturesKind::Vote, &[UNIT / 2], alice)
        .unwrap();

    // 4 of 8 epochs remaining: 3% fee, so 0.485 is reserved.
    assert_eq!(v.redemption_allowance(0, 6 * D), Ok(UNIT - 485 * UNIT / 1000));
    assert_eq!(
        v.redemption_allowance(0, 10 * D),
        Err(VaultError::InvalidIndices(0))
    );
    assert_eq!(
        v.redemption_allowance(3, 6 * D),
        Err(VaultError::InvalidIndices(3))
    );
}

#[test]
fn test_redemption_inside_last_epoch_mints_no_futures() {
    let mut v = vault();
    deposit(&mut v, "alice", UNIT, 0);
    let alice = addr("alice");

    let quotes = v
        .initiate_redemptions(
            at("alice", 10 * D - 60),
            &[0],
            FuturesKind::Reward,
            &[UNIT],
            alice,
        )
        .unwrap();

    assert_eq!(quotes[0].rounds, 0);
    assert_eq!(
        v.receipt_balance(ReceiptKind::DeferredClaim, &alice, 10 * D),
        quotes[0].post_fee
    );
    assert_eq!(
        v.receipt_supply(ReceiptKind::Futures(FuturesKind::Reward), 10 * D),
        0
    );
    assert!(v
        .events()
        .iter()
        .all(|record| record.event.name() != "futures_minted"));
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

/// Alice holds 0.7 primary at the epoch-D snapshot; Bob staked 0.3 for one
/// round with reward futures, so F = 0.3 for epoch D.
fn vault_with_split_population() -> Vault<MemoryHost> {
    let mut v = vault();
    deposit(&mut v, "alice", 7 * UNIT / 10, 0);
    deposit(&mut v, "bob", 3 * UNIT / 10, 0);
    v.stake(at("bob", 0), 1, FuturesKind::Reward, 3 * UNIT / 10, addr("bob"))
        .unwrap();
    v.take_epoch_snapshot(at("keeper", D)).unwrap();
    v
}

#[test]
fn test_reward_split_between_snapshot_and_futures_holders() {
    let mut v = vault_with_split_population();
    let claim = publish_reward(&mut v, reward_token(), 0, UNIT);

    let splits = v.claim_rewards(at("keeper", D + 10), &[claim]).unwrap();

    let split = splits[0];
    assert_eq!(split.fee, 4 * UNIT / 100);
    assert_eq!(split.snapshot_portion, 672 * UNIT / 1000);
    assert_eq!(split.futures_portion, 288 * UNIT / 1000);

    let record = v.epoch(D).unwrap();
    assert_eq!(record.reward_assets, vec![reward_token()]);
    assert_eq!(record.snapshot_reward_amounts, vec![672 * UNIT / 1000]);
    assert_eq!(record.futures_reward_amounts, vec![288 * UNIT / 1000]);
    assert_eq!(record.fee_amounts, vec![4 * UNIT / 100]);
    assert_eq!(
        v.host()
            .fee_sink()
            .collected(FeeClass::Reward, &reward_token()),
        4 * UNIT / 100
    );

    let alice_paid = v
        .redeem_snapshot_reward(at("alice", D + 20), D, 0, addr("alice"))
        .unwrap();
    assert_eq!(alice_paid, 672 * UNIT / 1000);

    let bob_paid = v
        .redeem_futures_rewards(at("bob", D + 30), D, addr("bob"))
        .unwrap();
    assert_eq!(bob_paid, vec![(reward_token(), 288 * UNIT / 1000)]);

    let custody = v.config().custody;
    assert_eq!(v.host().assets().balance_of(&custody, reward_token()), 0);
}

#[test]
fn test_snapshot_reward_redeemed_twice_fails() {
    let mut v = vault_with_split_population();
    let claim = publish_reward(&mut v, reward_token(), 0, UNIT);
    v.claim_rewards(at("keeper", D), &[claim]).unwrap();

    v.redeem_snapshot_rewards(at("alice", D), D, &[0], addr("alice"))
        .unwrap();
    assert!(v.is_snapshot_reward_redeemed(&addr("alice"), D, 0));

    assert_eq!(
        v.redeem_snapshot_reward(at("alice", D), D, 0, addr("carol")),
        Err(VaultError::AlreadyRedeemed { epoch: D, index: 0 })
    );
    assert_eq!(
        v.host().assets().balance_of(&addr("carol"), reward_token()),
        0
    );
}

#[test]
fn test_snapshot_reward_batch_with_bad_later_index_pays_nothing() {
    let mut v = vault_with_split_population();
    let claim = publish_reward(&mut v, reward_token(), 0, UNIT);
    v.claim_rewards(at("keeper", D), &[claim]).unwrap();
    let events = v.events().len();

    assert_eq!(
        v.redeem_snapshot_rewards(at("alice", D), D, &[0, 1], addr("alice")),
        Err(VaultError::InvalidIndices(1))
    );
    assert_eq!(
        v.redeem_snapshot_rewards(at("alice", D), D, &[0, 0], addr("alice")),
        Err(VaultError::AlreadyRedeemed { epoch: D, index: 0 })
    );
    assert_eq!(
        v.host().assets().balance_of(&addr("alice"), reward_token()),
        0
    );
    assert!(!v.is_snapshot_reward_redeemed(&addr("alice"), D, 0));
    assert_eq!(v.events().len(), events);
}

#[test]
fn test_claim_without_snapshot_fails_and_leaf_stays_claimable() {
    let mut v = vault();
    deposit(&mut v, "alice", UNIT, 0);
    let claim = publish_reward(&mut v, reward_token(), 3, UNIT);

    // Epoch D has no snapshot yet.
    assert_eq!(
        v.claim_rewards(at("keeper", D), &[claim.clone()]),
        Err(VaultError::SnapshotRequired(D))
    );
    assert!(!v.host_mut().reward_source().is_claimed(&reward_token(), 3));

    v.take_epoch_snapshot(at("keeper", D)).unwrap();
    v.claim_rewards(at("keeper", D), &[claim.clone()]).unwrap();
    assert_eq!(
        v.claim_rewards(at("keeper", D), &[claim]),
        Err(VaultError::AlreadyClaimed { index: 3 })
    );
}

#[test]
fn test_claim_with_bad_proof_changes_nothing() {
    let mut v = vault_with_split_population();
    let mut claim = publish_reward(&mut v, reward_token(), 0, UNIT);
    claim.amount = 2 * UNIT;
    let events_before = v.events().len();

    assert_eq!(
        v.claim_rewards(at("keeper", D), &[claim]),
        Err(VaultError::InvalidProof)
    );
    assert!(v.epoch(D).unwrap().reward_assets.is_empty());
    assert_eq!(v.events().len(), events_before);
}

#[test]
fn test_rewards_paid_in_directly_accumulate_per_asset() {
    let mut v = vault_with_split_population();
    let carol = addr("carol");
    let other = addr("other-token");
    v.host_mut().assets_mut().mint(&carol, reward_token(), 300).unwrap();
    v.host_mut().assets_mut().mint(&carol, other, 50).unwrap();

    v.claim_and_split(at("carol", D), &[reward_token(), other], &[100, 50])
        .unwrap();
    v.claim_and_split(at("carol", D + 1), &[reward_token()], &[200])
        .unwrap();

    let record = v.epoch(D).unwrap();
    assert_eq!(record.reward_assets, vec![reward_token(), other]);
    let total: Vec<u128> = (0..2)
        .map(|i| {
            record.fee_amounts[i] + record.snapshot_reward_amounts[i] + record.futures_reward_amounts[i]
        })
        .collect();
    assert_eq!(total, vec![300, 50]);
}

// ---------------------------------------------------------------------------
// Futures exchange
// ---------------------------------------------------------------------------

#[test]
fn test_exchanged_futures_redeem_pro_rata() {
    let mut v = vault();
    deposit(&mut v, "alice", UNIT, 0);
    deposit(&mut v, "bob", UNIT, 0);
    let alice = addr("alice");
    let bob = addr("bob");

    // Both redeem at 6D with vote futures for 7D..10D.
    v.initiate_redemptions(at("alice", 6 * D), &[0], FuturesKind::Vote, &[UNIT], alice)
        .unwrap();
    v.initiate_redemptions(at("bob", 6 * D), &[0], FuturesKind::Vote, &[UNIT / 2], bob)
        .unwrap();
    let alice_futures = v.receipt_balance(ReceiptKind::Futures(FuturesKind::Vote), &alice, 8 * D);
    let bob_futures = v.receipt_balance(ReceiptKind::Futures(FuturesKind::Vote), &bob, 8 * D);

    // Only future epochs can be exchanged.
    assert_eq!(
        v.exchange_futures(at("alice", 8 * D), 8 * D, alice_futures, alice, FuturesKind::Vote),
        Err(VaultError::PastExchangePeriod {
            epoch: 8 * D,
            current: 8 * D
        })
    );
    v.exchange_futures(at("alice", 6 * D), 8 * D, alice_futures, alice, FuturesKind::Vote)
        .unwrap();
    v.exchange_futures(at("bob", 7 * D), 8 * D, bob_futures, bob, FuturesKind::Vote)
        .unwrap();
    assert_eq!(
        v.receipt_balance(ReceiptKind::Futures(FuturesKind::Vote), &alice, 8 * D),
        0
    );

    // Epoch 8D: rewards arrive and are split.
    let claim = publish_reward(&mut v, reward_token(), 0, 10 * UNIT);
    v.take_epoch_snapshot(at("keeper", 8 * D)).unwrap();
    let split = v.claim_rewards(at("keeper", 8 * D), &[claim]).unwrap()[0];
    let futures_supply = alice_futures + bob_futures;
    assert_eq!(
        v.receipt_supply(ReceiptKind::Futures(FuturesKind::Reward), 8 * D),
        futures_supply
    );

    let alice_paid = v
        .redeem_futures_rewards(at("alice", 9 * D), 8 * D, alice)
        .unwrap();
    let bob_paid = v
        .redeem_futures_rewards(at("bob", 9 * D), 8 * D, bob)
        .unwrap();

    let alice_expected = mul_div(split.futures_portion, alice_futures, futures_supply).unwrap();
    assert_eq!(alice_paid, vec![(reward_token(), alice_expected)]);
    assert_eq!(
        bob_paid,
        vec![(reward_token(), split.futures_portion - alice_expected)]
    );
    assert_eq!(v.epoch(8 * D).unwrap().futures_reward_remaining, vec![0]);
    assert_eq!(
        v.epoch(8 * D).unwrap().futures_reward_amounts,
        vec![split.futures_portion]
    );
}

// ---------------------------------------------------------------------------
// Staking
// ---------------------------------------------------------------------------

#[test]
fn test_stake_for_max_rounds_and_unstake() {
    let mut v = vault();
    deposit(&mut v, "alice", UNIT, 0);
    let alice = addr("alice");

    let expiry = v
        .stake(at("alice", 0), 255, FuturesKind::Vote, UNIT, alice)
        .unwrap();
    assert_eq!(expiry, 255 * D);
    assert_eq!(v.primary_balance(&alice), 0);
    assert_eq!(v.receipt_balance(ReceiptKind::Stake, &alice, expiry), UNIT);
    assert_eq!(
        v.receipt_balance(ReceiptKind::Futures(FuturesKind::Vote), &alice, 200 * D),
        UNIT
    );

    assert_eq!(
        v.unstake(at("alice", expiry - 1), expiry, UNIT, alice),
        Err(VaultError::BeforeStakingExpiry {
            expiry,
            now: expiry - 1
        })
    );

    v.unstake(at("alice", expiry), expiry, UNIT, alice).unwrap();
    assert_eq!(v.primary_balance(&alice), UNIT);
    assert_eq!(v.host().primary().total_supply(FUNGIBLE), UNIT);
    assert_eq!(v.receipt_supply(ReceiptKind::Stake, expiry), 0);
}
