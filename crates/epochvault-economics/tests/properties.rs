// crates/epochvault-economics/tests/properties.rs
//
// Property tests for the reward split, the exit-fee curve, and snapshot
// reward payouts.

use proptest::prelude::*;

use epochvault_core::traits::{BalanceLedger, Host, SnapshotLedger, FUNGIBLE};
use epochvault_core::Address;
use epochvault_economics::{
    apply_fee, redemption_fee_percent, split_reward, EpochClock, EventLog, RewardDistributor,
    FEE_MAX,
};
use epochvault_store::MemoryHost;

fn fee_bounds() -> impl Strategy<Value = (u32, u32)> {
    (0..=FEE_MAX).prop_flat_map(|min| (Just(min), min..=FEE_MAX))
}

proptest! {
    #[test]
    fn split_parts_sum_to_amount(
        amount in 0u128..=u128::MAX / 2,
        fee in 0..=FEE_MAX,
        snapshot_supply in 0u128..=1u128 << 100,
        futures_supply in 0u128..=1u128 << 100,
    ) {
        let asset = Address::from_label("asset");
        let split = split_reward(asset, amount, fee, snapshot_supply, futures_supply).unwrap();
        let (expected_fee, post_fee) = apply_fee(amount, fee).unwrap();

        prop_assert_eq!(split.fee + split.snapshot_portion + split.futures_portion, amount);
        prop_assert_eq!(split.fee, expected_fee);
        prop_assert_eq!(split.snapshot_portion + split.futures_portion, post_fee);
        if futures_supply == 0 {
            prop_assert_eq!(split.futures_portion, 0);
        }
        if snapshot_supply == 0 && futures_supply > 0 {
            prop_assert_eq!(split.snapshot_portion, 0);
        }
    }

    #[test]
    fn exit_fee_non_increasing_and_clamped(
        (fee_min, fee_max) in fee_bounds(),
        horizon in 1u64..=1u64 << 40,
        a in 0u64..=1u64 << 41,
        b in 0u64..=1u64 << 41,
    ) {
        let (shorter, longer) = if a <= b { (a, b) } else { (b, a) };
        let fee_short = redemption_fee_percent(fee_min, fee_max, shorter, horizon);
        let fee_long = redemption_fee_percent(fee_min, fee_max, longer, horizon);

        prop_assert!(fee_short <= fee_long);
        prop_assert!(fee_min <= fee_short && fee_long <= fee_max);
        if longer >= horizon {
            prop_assert_eq!(fee_long, fee_max);
        }
    }

    #[test]
    fn epoch_key_contains_timestamp(duration in 1u64..=1u64 << 32, t in 0u64..=1u64 << 60) {
        let clock = EpochClock::new(duration).unwrap();
        let epoch = clock.epoch_at(t);
        prop_assert_eq!(epoch % duration, 0);
        prop_assert!(epoch <= t);
        prop_assert!(t - epoch < duration);
    }

    /// Every holder redeeming their snapshot share never pays out more than
    /// the snapshot portion, and leaves less than one unit per holder.
    #[test]
    fn snapshot_payouts_bounded_by_portion(
        balances in prop::collection::vec(1u128..=1u128 << 80, 1..8),
        reward in 0u128..=1u128 << 90,
    ) {
        const D: u64 = 1_000;
        let custody = Address::from_label("vault");
        let asset = Address::from_label("reward-token");
        let mut host = MemoryHost::new(D, 10 * D);
        let mut log = EventLog::new();
        let mut distributor = RewardDistributor::new(EpochClock::new(D).unwrap(), custody);

        let holders: Vec<Address> = (0..balances.len())
            .map(|i| Address::from_label(&format!("holder-{}", i)))
            .collect();
        for (holder, balance) in holders.iter().zip(&balances) {
            host.primary_mut().mint(holder, FUNGIBLE, *balance).unwrap();
        }
        let keeper = Address::from_label("keeper");
        let snapshot = distributor.take_epoch_snapshot(&mut host, &mut log, &keeper, D).unwrap();
        prop_assert_eq!(host.primary().total_supply_at(snapshot).unwrap(), balances.iter().sum::<u128>());

        host.assets_mut().mint(&custody, asset, reward).unwrap();
        let split = distributor
            .claim_and_split(&mut host, &mut log, &[asset], &[reward], 0, &keeper, D)
            .unwrap()[0];

        let mut paid = 0u128;
        for holder in &holders {
            paid += distributor
                .redeem_snapshot_reward(&mut host, &mut log, D, 0, holder, holder)
                .unwrap();
        }
        prop_assert!(paid <= split.snapshot_portion);
        prop_assert!(split.snapshot_portion - paid < holders.len() as u128);
        prop_assert_eq!(
            host.assets().balance_of(&custody, asset),
            reward - paid
        );
    }
}
