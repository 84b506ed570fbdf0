// crates/epochvault-store/src/snapshot.rs
//
// Checkpointing fungible ledger for the primary token.
//
// Snapshots are lazy: taking one only bumps the id. Before an account's
// balance (or the supply) changes for the first time after a snapshot, its
// pre-change value is recorded against the current snapshot id. Reading
// `balance_of_at(id)` finds the first checkpoint at or after `id`; if none
// exists the value has not changed since and the live value is returned.

use std::collections::BTreeMap;

use epochvault_core::error::VaultError;
use epochvault_core::traits::{BalanceLedger, SnapshotId, SnapshotLedger, TokenId, FUNGIBLE};
use epochvault_core::Address;

/// (snapshot id, value as of that snapshot), ascending by id.
type Checkpoints = Vec<(SnapshotId, u128)>;

#[derive(Debug, Clone, Default)]
pub struct SnapshotToken {
    balances: BTreeMap<Address, u128>,
    supply: u128,
    current_snapshot: SnapshotId,
    account_checkpoints: BTreeMap<Address, Checkpoints>,
    supply_checkpoints: Checkpoints,
}

fn record(checkpoints: &mut Checkpoints, current: SnapshotId, value: u128) {
    if current == 0 {
        return;
    }
    let stale = checkpoints.last().map_or(true, |(id, _)| *id < current);
    if stale {
        checkpoints.push((current, value));
    }
}

fn value_at(checkpoints: &Checkpoints, snapshot: SnapshotId, live: u128) -> u128 {
    let pos = checkpoints.partition_point(|(id, _)| *id < snapshot);
    checkpoints.get(pos).map_or(live, |(_, value)| *value)
}

impl SnapshotToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_fungible(id: TokenId) -> Result<(), VaultError> {
        if id != FUNGIBLE {
            return Err(VaultError::Ledger(format!(
                "primary ledger is fungible, got token id {}",
                id
            )));
        }
        Ok(())
    }

    fn update_account(&mut self, account: &Address, value: u128) {
        let before = self.balances.get(account).copied().unwrap_or(0);
        record(
            self.account_checkpoints.entry(*account).or_default(),
            self.current_snapshot,
            before,
        );
        if value == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, value);
        }
    }

    fn update_supply(&mut self, value: u128) {
        record(&mut self.supply_checkpoints, self.current_snapshot, self.supply);
        self.supply = value;
    }

    fn check_snapshot(&self, snapshot: SnapshotId) -> Result<(), VaultError> {
        if snapshot == 0 || snapshot > self.current_snapshot {
            return Err(VaultError::Ledger(format!(
                "snapshot {} does not exist (current {})",
                snapshot, self.current_snapshot
            )));
        }
        Ok(())
    }
}

impl BalanceLedger for SnapshotToken {
    fn mint(&mut self, to: &Address, id: TokenId, amount: u128) -> Result<(), VaultError> {
        Self::check_fungible(id)?;
        let to = to.require_non_zero()?;
        let supply = self
            .supply
            .checked_add(amount)
            .ok_or(VaultError::Overflow("primary supply"))?;
        let balance = self
            .balance_of(&to, FUNGIBLE)
            .checked_add(amount)
            .ok_or(VaultError::Overflow("primary balance"))?;
        self.update_account(&to, balance);
        self.update_supply(supply);
        Ok(())
    }

    fn burn(&mut self, from: &Address, id: TokenId, amount: u128) -> Result<(), VaultError> {
        Self::check_fungible(id)?;
        let balance = self.balance_of(from, FUNGIBLE);
        if balance < amount {
            return Err(VaultError::InsufficientBalance(format!(
                "primary: account {} holds {} but {} is required",
                from, balance, amount
            )));
        }
        let supply = self
            .supply
            .checked_sub(amount)
            .ok_or(VaultError::Underflow("primary supply"))?;
        self.update_account(from, balance - amount);
        self.update_supply(supply);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        from: &Address,
        to: &Address,
        id: TokenId,
        amount: u128,
    ) -> Result<(), VaultError> {
        Self::check_fungible(id)?;
        let to = to.require_non_zero()?;
        let from_balance = self.balance_of(from, FUNGIBLE);
        if from_balance < amount {
            return Err(VaultError::InsufficientBalance(format!(
                "primary: account {} holds {} but {} is required",
                from, from_balance, amount
            )));
        }
        self.update_account(from, from_balance - amount);
        let to_balance = self
            .balance_of(&to, FUNGIBLE)
            .checked_add(amount)
            .ok_or(VaultError::Overflow("primary balance"))?;
        self.update_account(&to, to_balance);
        Ok(())
    }

    fn balance_of(&self, account: &Address, _id: TokenId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self, _id: TokenId) -> u128 {
        self.supply
    }
}

impl SnapshotLedger for SnapshotToken {
    fn snapshot(&mut self) -> SnapshotId {
        self.current_snapshot += 1;
        tracing::debug!("Primary ledger snapshot {} taken", self.current_snapshot);
        self.current_snapshot
    }

    fn current_snapshot_id(&self) -> SnapshotId {
        self.current_snapshot
    }

    fn balance_of_at(&self, account: &Address, snapshot: SnapshotId) -> Result<u128, VaultError> {
        self.check_snapshot(snapshot)?;
        let live = self.balance_of(account, FUNGIBLE);
        Ok(self
            .account_checkpoints
            .get(account)
            .map_or(live, |checkpoints| value_at(checkpoints, snapshot, live)))
    }

    fn total_supply_at(&self, snapshot: SnapshotId) -> Result<u128, VaultError> {
        self.check_snapshot(snapshot)?;
        Ok(value_at(&self.supply_checkpoints, snapshot, self.supply))
    }
}
