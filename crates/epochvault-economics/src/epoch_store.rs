// crates/epochvault-economics/src/epoch_store.rs
//
// Per-epoch reward records and the snapshot-reward redemption marks.
//
// An epoch record holds parallel arrays indexed by reward index: the asset,
// the snapshot holders' portion, the futures holders' portion (as recorded
// and as still unpaid), and the fee taken. An asset's reward index is fixed
// the first time the asset is recorded in that epoch, so later batches of
// the same asset accumulate into the same slot.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use epochvault_core::error::VaultError;
use epochvault_core::traits::SnapshotId;
use epochvault_core::{Address, AssetId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    /// Primary-ledger snapshot for this epoch, 0 until taken.
    pub snapshot_id: SnapshotId,
    pub reward_assets: Vec<AssetId>,
    pub snapshot_reward_amounts: Vec<u128>,
    /// Futures portions as recorded. Never decreases.
    pub futures_reward_amounts: Vec<u128>,
    /// Futures portions not yet paid out.
    pub futures_reward_remaining: Vec<u128>,
    pub fee_amounts: Vec<u128>,
}

impl Epoch {
    pub fn has_snapshot(&self) -> bool {
        self.snapshot_id != 0
    }

    pub fn reward_count(&self) -> usize {
        self.reward_assets.len()
    }

    pub fn reward_index(&self, asset: &AssetId) -> Option<usize> {
        self.reward_assets.iter().position(|a| a == asset)
    }

    /// Accumulate one split reward into the asset's slot, creating the slot
    /// on first sight. Returns the reward index.
    pub fn record(
        &mut self,
        asset: AssetId,
        fee: u128,
        snapshot_portion: u128,
        futures_portion: u128,
    ) -> Result<usize, VaultError> {
        let index = match self.reward_index(&asset) {
            Some(index) => index,
            None => {
                self.reward_assets.push(asset);
                self.snapshot_reward_amounts.push(0);
                self.futures_reward_amounts.push(0);
                self.futures_reward_remaining.push(0);
                self.fee_amounts.push(0);
                self.reward_assets.len() - 1
            }
        };

        add_into(&mut self.fee_amounts[index], fee)?;
        add_into(&mut self.snapshot_reward_amounts[index], snapshot_portion)?;
        add_into(&mut self.futures_reward_amounts[index], futures_portion)?;
        add_into(&mut self.futures_reward_remaining[index], futures_portion)?;
        Ok(index)
    }
}

fn add_into(slot: &mut u128, amount: u128) -> Result<(), VaultError> {
    *slot = slot
        .checked_add(amount)
        .ok_or(VaultError::Overflow("epoch reward total"))?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct EpochStore {
    epochs: BTreeMap<u64, Epoch>,
    /// (account, epoch, reward index) triples already paid from the
    /// snapshot portion.
    redeemed: BTreeSet<(Address, u64, usize)>,
}

impl EpochStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, epoch: u64) -> Option<&Epoch> {
        self.epochs.get(&epoch)
    }

    pub fn get_mut(&mut self, epoch: u64) -> Option<&mut Epoch> {
        self.epochs.get_mut(&epoch)
    }

    pub fn get_or_create(&mut self, epoch: u64) -> &mut Epoch {
        self.epochs.entry(epoch).or_default()
    }

    /// Snapshot id recorded for `epoch`, 0 if none.
    pub fn snapshot_id(&self, epoch: u64) -> SnapshotId {
        self.epochs.get(&epoch).map(|e| e.snapshot_id).unwrap_or(0)
    }

    /// Record `snapshot_id` for `epoch`. An epoch's snapshot is set once.
    pub fn set_snapshot(&mut self, epoch: u64, snapshot_id: SnapshotId) -> Result<(), VaultError> {
        let record = self.get_or_create(epoch);
        if record.has_snapshot() {
            return Err(VaultError::InvalidEpoch(epoch));
        }
        record.snapshot_id = snapshot_id;
        Ok(())
    }

    pub fn is_redeemed(&self, account: &Address, epoch: u64, reward_index: usize) -> bool {
        self.redeemed.contains(&(*account, epoch, reward_index))
    }

    /// # Errors
    /// `AlreadyRedeemed` if the mark is already set.
    pub fn mark_redeemed(
        &mut self,
        account: &Address,
        epoch: u64,
        reward_index: usize,
    ) -> Result<(), VaultError> {
        if !self.redeemed.insert((*account, epoch, reward_index)) {
            return Err(VaultError::AlreadyRedeemed {
                epoch,
                index: reward_index,
            });
        }
        Ok(())
    }

    pub fn epochs(&self) -> impl Iterator<Item = (u64, &Epoch)> {
        self.epochs.iter().map(|(k, v)| (*k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates_same_asset() {
        let mut epoch = Epoch::default();
        let a = Address::from_label("asset-a");
        let b = Address::from_label("asset-b");

        assert_eq!(epoch.record(a, 1, 10, 5).unwrap(), 0);
        assert_eq!(epoch.record(b, 0, 7, 0).unwrap(), 1);
        assert_eq!(epoch.record(a, 2, 20, 10).unwrap(), 0);

        assert_eq!(epoch.reward_count(), 2);
        assert_eq!(epoch.fee_amounts, vec![3, 0]);
        assert_eq!(epoch.snapshot_reward_amounts, vec![30, 7]);
        assert_eq!(epoch.futures_reward_amounts, vec![15, 0]);
        assert_eq!(epoch.futures_reward_remaining, vec![15, 0]);
    }

    #[test]
    fn test_snapshot_set_once() {
        let mut store = EpochStore::new();
        assert_eq!(store.snapshot_id(100), 0);
        store.set_snapshot(100, 1).unwrap();
        assert_eq!(store.snapshot_id(100), 1);
        assert_eq!(store.set_snapshot(100, 2), Err(VaultError::InvalidEpoch(100)));
        assert_eq!(store.snapshot_id(100), 1);
    }

    #[test]
    fn test_redeemed_marks_are_per_account() {
        let mut store = EpochStore::new();
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");

        store.mark_redeemed(&alice, 100, 0).unwrap();
        assert!(store.is_redeemed(&alice, 100, 0));
        assert!(!store.is_redeemed(&bob, 100, 0));
        assert!(!store.is_redeemed(&alice, 100, 1));
        assert_eq!(
            store.mark_redeemed(&alice, 100, 0),
            Err(VaultError::AlreadyRedeemed { epoch: 100, index: 0 })
        );
        store.mark_redeemed(&bob, 100, 0).unwrap();
    }
}
