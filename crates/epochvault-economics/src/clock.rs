// crates/epochvault-economics/src/clock.rs
//
// Epoch clock: maps any timestamp to the key of the epoch containing it.
//
// epoch(t) = floor(t / D) * D. The duration D is fixed for the lifetime of a
// vault. "Current epoch" is always recomputed from the caller's timestamp.

use serde::{Deserialize, Serialize};

use epochvault_core::error::VaultError;

/// Default epoch duration: two weeks in seconds.
pub const DEFAULT_EPOCH_DURATION: u64 = 1_209_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClock {
    duration: u64,
}

impl EpochClock {
    /// # Errors
    /// `InvalidConfig` for a zero duration.
    pub fn new(duration: u64) -> Result<Self, VaultError> {
        if duration == 0 {
            return Err(VaultError::InvalidConfig(
                "epoch duration must be non-zero".to_string(),
            ));
        }
        Ok(Self { duration })
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Key of the epoch containing `timestamp`.
    pub fn epoch_at(&self, timestamp: u64) -> u64 {
        (timestamp / self.duration) * self.duration
    }

    /// Key of the epoch `rounds` epochs after the one containing `timestamp`.
    pub fn epochs_ahead(&self, timestamp: u64, rounds: u64) -> Result<u64, VaultError> {
        rounds
            .checked_mul(self.duration)
            .and_then(|offset| self.epoch_at(timestamp).checked_add(offset))
            .ok_or(VaultError::Overflow("epoch key"))
    }

    /// Number of whole epochs contained in `remaining` seconds.
    pub fn whole_rounds(&self, remaining: u64) -> u64 {
        remaining / self.duration
    }
}

impl Default for EpochClock {
    fn default() -> Self {
        Self {
            duration: DEFAULT_EPOCH_DURATION,
        }
    }
}
