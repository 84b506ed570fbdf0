// crates/epochvault-economics/src/rewards.rs
//
// Reward distribution: splitting claimed batches and paying them out.
//
// A claimed reward of `amount` in epoch e is split as:
//   fee              = amount * reward_fee / FEE_DENOMINATOR
//   snapshot_portion = (amount - fee) * S / (S + F)
//   futures_portion  = (amount - fee) - snapshot_portion
// where S is the primary supply at e's snapshot and F is the supply of
// reward futures for e. With S + F == 0 the whole post-fee amount goes to
// the snapshot portion.
//
// Snapshot holders redeem pro rata to their snapshot balance, once per
// (account, epoch, reward index). Reward-futures holders redeem pro rata to
// the futures still outstanding; their receipts are burned on redemption, so
// each payout is taken from the remaining pool.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use epochvault_core::error::VaultError;
use epochvault_core::receipt::{FuturesKind, ReceiptKind};
use epochvault_core::traits::{BalanceLedger, FeeClass, FeeSink, Host, SnapshotLedger};
use epochvault_core::{Address, AssetId};

use crate::clock::EpochClock;
use crate::epoch_store::EpochStore;
use crate::events::{EventLog, VaultEvent};
use crate::token::{apply_fee, mul_div};

/// Outcome of splitting one claimed reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSplit {
    pub asset: AssetId,
    pub amount: u128,
    pub fee: u128,
    pub snapshot_portion: u128,
    pub futures_portion: u128,
}

/// Split `amount` given the snapshot supply and the reward-futures supply.
///
/// `fee + snapshot_portion + futures_portion == amount` always holds.
pub fn split_reward(
    asset: AssetId,
    amount: u128,
    fee_percent: u32,
    snapshot_supply: u128,
    futures_supply: u128,
) -> Result<RewardSplit, VaultError> {
    let (fee, post_fee) = apply_fee(amount, fee_percent)?;
    let total = snapshot_supply
        .checked_add(futures_supply)
        .ok_or(VaultError::Overflow("reward split supply"))?;
    let snapshot_portion = if total == 0 {
        post_fee
    } else {
        mul_div(post_fee, snapshot_supply, total)?
    };
    let futures_portion = post_fee
        .checked_sub(snapshot_portion)
        .ok_or(VaultError::Underflow("futures portion"))?;

    Ok(RewardSplit {
        asset,
        amount,
        fee,
        snapshot_portion,
        futures_portion,
    })
}

/// Keeps the epoch records and pays holders out of the vault's custody.
#[derive(Debug, Clone)]
pub struct RewardDistributor {
    clock: EpochClock,
    custody: Address,
    epochs: EpochStore,
}

impl RewardDistributor {
    /// `custody` is the asset-ledger account reward assets are held in.
    pub fn new(clock: EpochClock, custody: Address) -> Self {
        Self {
            clock,
            custody,
            epochs: EpochStore::new(),
        }
    }

    pub fn epochs(&self) -> &EpochStore {
        &self.epochs
    }

    /// Snapshot id of the epoch containing `now`, 0 if none yet.
    pub fn current_snapshot_id(&self, now: u64) -> u64 {
        self.epochs.snapshot_id(self.clock.epoch_at(now))
    }

    /// Snapshot the primary ledger for the current epoch, at most once per
    /// epoch. Returns the epoch's snapshot id either way.
    pub fn take_epoch_snapshot<H: Host>(
        &mut self,
        host: &mut H,
        log: &mut EventLog,
        actor: &Address,
        now: u64,
    ) -> Result<u64, VaultError> {
        let epoch = self.clock.epoch_at(now);
        let existing = self.epochs.snapshot_id(epoch);
        if existing != 0 {
            return Ok(existing);
        }

        let snapshot_id = host.primary_mut().snapshot();
        self.epochs.set_snapshot(epoch, snapshot_id)?;
        log.emit(
            epoch,
            VaultEvent::SnapshotTaken {
                actor: *actor,
                snapshot_id,
            },
        );
        Ok(snapshot_id)
    }

    /// Split a batch of rewards already held in custody into the current
    /// epoch's record, moving each fee to the fee sink.
    ///
    /// # Errors
    /// `EmptyArray` / `MismatchedArrayLengths` for a malformed batch and
    /// `SnapshotRequired` if the current epoch has no snapshot.
    #[allow(clippy::too_many_arguments)]
    pub fn claim_and_split<H: Host>(
        &mut self,
        host: &mut H,
        log: &mut EventLog,
        assets: &[AssetId],
        amounts: &[u128],
        fee_percent: u32,
        actor: &Address,
        now: u64,
    ) -> Result<Vec<RewardSplit>, VaultError> {
        if assets.is_empty() {
            return Err(VaultError::EmptyArray);
        }
        if assets.len() != amounts.len() {
            return Err(VaultError::MismatchedArrayLengths(assets.len(), amounts.len()));
        }

        let epoch = self.clock.epoch_at(now);
        let snapshot_id = self.epochs.snapshot_id(epoch);
        if snapshot_id == 0 {
            return Err(VaultError::SnapshotRequired(epoch));
        }
        let snapshot_supply = host.primary().total_supply_at(snapshot_id)?;
        let futures_supply = host
            .receipts(ReceiptKind::Futures(FuturesKind::Reward))
            .total_supply(epoch);
        let sink_account = host.fee_sink().account();

        let mut splits = Vec::with_capacity(assets.len());
        for (asset, amount) in assets.iter().zip(amounts) {
            let split = split_reward(*asset, *amount, fee_percent, snapshot_supply, futures_supply)?;

            if split.fee > 0 {
                host.assets_mut()
                    .transfer_from(&self.custody, &sink_account, *asset, split.fee)?;
                host.fee_sink_mut()
                    .distribute(FeeClass::Reward, asset, split.fee)?;
            }
            self.epochs.get_or_create(epoch).record(
                *asset,
                split.fee,
                split.snapshot_portion,
                split.futures_portion,
            )?;

            log.emit(
                epoch,
                VaultEvent::RewardSplit {
                    actor: *actor,
                    asset: *asset,
                    amount: split.amount,
                    fee: split.fee,
                    snapshot_portion: split.snapshot_portion,
                    futures_portion: split.futures_portion,
                },
            );
            splits.push(split);
        }

        tracing::debug!(epoch, rewards = splits.len(), snapshot_supply, futures_supply, "rewards split");
        Ok(splits)
    }

    /// Pay `account`'s share of the snapshot portion at `reward_index` of
    /// `epoch` to `receiver`. Returns the amount paid.
    pub fn redeem_snapshot_reward<H: Host>(
        &mut self,
        host: &mut H,
        log: &mut EventLog,
        epoch: u64,
        reward_index: usize,
        account: &Address,
        receiver: &Address,
    ) -> Result<u128, VaultError> {
        let paid = self.redeem_snapshot_rewards(host, log, epoch, &[reward_index], account, receiver)?;
        Ok(paid.iter().sum())
    }

    /// Batch form of [`Self::redeem_snapshot_reward`]. Amounts are returned
    /// in `reward_indexes` order. The batch is all-or-nothing: an invalid,
    /// repeated, or already-redeemed index fails it before anything is paid.
    pub fn redeem_snapshot_rewards<H: Host>(
        &mut self,
        host: &mut H,
        log: &mut EventLog,
        epoch: u64,
        reward_indexes: &[usize],
        account: &Address,
        receiver: &Address,
    ) -> Result<Vec<u128>, VaultError> {
        if epoch == 0 {
            return Err(VaultError::InvalidEpoch(epoch));
        }
        if reward_indexes.is_empty() {
            return Err(VaultError::EmptyArray);
        }
        receiver.require_non_zero()?;

        let record = self
            .epochs
            .get(epoch)
            .filter(|e| e.has_snapshot())
            .cloned()
            .ok_or(VaultError::InvalidEpoch(epoch))?;

        let balance = host.primary().balance_of_at(account, record.snapshot_id)?;
        if balance == 0 {
            return Err(VaultError::InsufficientBalance(format!(
                "{} held nothing at the epoch {} snapshot",
                account, epoch
            )));
        }
        let supply = host.primary().total_supply_at(record.snapshot_id)?;

        // Every index is checked and every share priced before the first
        // mark or transfer, so a bad entry anywhere rejects the whole batch.
        let mut seen = BTreeSet::new();
        let mut owed: BTreeMap<AssetId, u128> = BTreeMap::new();
        let mut shares = Vec::with_capacity(reward_indexes.len());
        for &index in reward_indexes {
            if index >= record.reward_count() {
                return Err(VaultError::InvalidIndices(index));
            }
            if !seen.insert(index) || self.epochs.is_redeemed(account, epoch, index) {
                return Err(VaultError::AlreadyRedeemed { epoch, index });
            }
            let asset = record.reward_assets[index];
            let share = mul_div(record.snapshot_reward_amounts[index], balance, supply)?;
            let total = owed.entry(asset).or_insert(0);
            *total = total
                .checked_add(share)
                .ok_or(VaultError::Overflow("snapshot reward batch"))?;
            shares.push((index, asset, share));
        }
        for (asset, total) in &owed {
            let held = host.assets().balance_of(&self.custody, *asset);
            if held < *total {
                return Err(VaultError::InsufficientBalance(format!(
                    "custody holds {} of {}, batch owes {}",
                    held, asset, total
                )));
            }
        }

        let mut paid = Vec::with_capacity(shares.len());
        for (index, asset, share) in shares {
            self.epochs.mark_redeemed(account, epoch, index)?;
            if share > 0 {
                host.assets_mut()
                    .transfer_from(&self.custody, receiver, asset, share)?;
            }

            log.emit(
                epoch,
                VaultEvent::SnapshotRewardRedeemed {
                    actor: *account,
                    receiver: *receiver,
                    reward_index: index,
                    asset,
                    amount: share,
                },
            );
            paid.push(share);
        }
        Ok(paid)
    }

    /// Burn all of `account`'s reward futures for `epoch` and pay their pro
    /// rata share of every futures reward still unpaid in that epoch.
    pub fn redeem_futures_rewards<H: Host>(
        &mut self,
        host: &mut H,
        log: &mut EventLog,
        epoch: u64,
        account: &Address,
        receiver: &Address,
        now: u64,
    ) -> Result<Vec<(AssetId, u128)>, VaultError> {
        if epoch == 0 || epoch > self.clock.epoch_at(now) {
            return Err(VaultError::InvalidEpoch(epoch));
        }
        receiver.require_non_zero()?;

        let kind = ReceiptKind::Futures(FuturesKind::Reward);
        let balance = host.receipts(kind).balance_of(account, epoch);
        if balance == 0 {
            return Err(VaultError::InsufficientBalance(format!(
                "{} holds no reward futures for epoch {}",
                account, epoch
            )));
        }
        let supply = host.receipts(kind).total_supply(epoch);

        let mut payouts = Vec::new();
        if let Some(record) = self.epochs.get_mut(epoch) {
            for index in 0..record.reward_assets.len() {
                let remaining = record.futures_reward_remaining[index];
                let share = mul_div(remaining, balance, supply)?;
                record.futures_reward_remaining[index] = remaining - share;

                let asset = record.reward_assets[index];
                if share > 0 {
                    host.assets_mut()
                        .transfer_from(&self.custody, receiver, asset, share)?;
                }
                payouts.push((asset, share));
            }
        }

        host.receipts_mut(kind).burn(account, epoch, balance)?;

        log.emit(
            epoch,
            VaultEvent::FuturesRewardsRedeemed {
                actor: *account,
                receiver: *receiver,
                burned: balance,
                payouts: payouts.clone(),
            },
        );
        Ok(payouts)
    }
}
