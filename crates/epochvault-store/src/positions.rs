// crates/epochvault-store/src/positions.rs
//
// In-memory locking adapter.
//
// Locks made during the same epoch share an unlock time of
// `epoch_start + lock_duration` and are merged into one position, so the
// position list stays sorted by unlock time and each unlock time appears at
// most once.

use epochvault_core::error::VaultError;
use epochvault_core::traits::{LockedPosition, PositionProvider};
use epochvault_core::Address;

#[derive(Debug, Clone)]
pub struct MemoryPositions {
    locks: Vec<LockedPosition>,
    epoch_duration: u64,
    lock_duration: u64,
    custody: Address,
}

impl MemoryPositions {
    /// Create an adapter locking for `lock_duration` seconds counted from the
    /// start of the epoch the lock is made in.
    pub fn new(epoch_duration: u64, lock_duration: u64, custody: Address) -> Self {
        Self {
            locks: Vec::new(),
            epoch_duration,
            lock_duration,
            custody,
        }
    }

    /// Insert a position directly. Used by fixtures that need a lock with a
    /// specific unlock time.
    pub fn insert(&mut self, position: LockedPosition) {
        match self
            .locks
            .binary_search_by_key(&position.unlock_time, |p| p.unlock_time)
        {
            Ok(i) => self.locks[i].amount += position.amount,
            Err(i) => self.locks.insert(i, position),
        }
    }

    pub fn positions(&self) -> &[LockedPosition] {
        &self.locks
    }
}

impl PositionProvider for MemoryPositions {
    fn lock_at(&self, index: usize) -> Option<LockedPosition> {
        self.locks.get(index).copied()
    }

    fn lock_count(&self) -> usize {
        self.locks.len()
    }

    fn lock(&mut self, amount: u128, now: u64) -> Result<(), VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if self.epoch_duration == 0 {
            return Err(VaultError::InvalidConfig("epoch duration is zero".to_string()));
        }
        let epoch_start = (now / self.epoch_duration) * self.epoch_duration;
        let unlock_time = epoch_start
            .checked_add(self.lock_duration)
            .ok_or(VaultError::Overflow("unlock time"))?;
        self.insert(LockedPosition {
            amount,
            unlock_time,
        });
        tracing::debug!("Locked {} until {}", amount, unlock_time);
        Ok(())
    }

    fn process_expired_locks(&mut self, now: u64) -> Result<u128, VaultError> {
        let split = self.locks.partition_point(|p| p.unlock_time <= now);
        let released = self
            .locks
            .drain(..split)
            .try_fold(0u128, |acc, p| acc.checked_add(p.amount))
            .ok_or(VaultError::Overflow("released amount"))?;
        Ok(released)
    }

    fn locked_balance(&self) -> u128 {
        self.locks.iter().map(|p| p.amount).sum()
    }

    fn custody_account(&self) -> Address {
        self.custody
    }
}
