// crates/epochvault-economics/src/fees.rs
//
// Fee schedule for the vault.
//
// Four fees, each in parts per million and capped at FEE_MAX:
//   - Reward:        skimmed off every claimed reward batch
//   - RedemptionMax: exit fee for redemptions at or beyond the horizon
//   - RedemptionMin: exit fee for a redemption at its unlock time
//   - Developers:    share of a deposit minted to a whitelisted developer
//
// The exit fee decays linearly from RedemptionMax (remaining time at or
// beyond max_redemption_time) down to RedemptionMin (remaining time zero).

use serde::{Deserialize, Serialize};

use epochvault_core::error::VaultError;

use crate::token::FEE_MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeeKind {
    Reward,
    RedemptionMax,
    RedemptionMin,
    Developers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    reward: u32,
    redemption_max: u32,
    redemption_min: u32,
    developers: u32,
}

impl FeeSchedule {
    /// # Errors
    /// `InvalidFee` if any fee exceeds `FEE_MAX` or the redemption minimum
    /// exceeds the maximum.
    pub fn new(
        reward: u32,
        redemption_max: u32,
        redemption_min: u32,
        developers: u32,
    ) -> Result<Self, VaultError> {
        let schedule = Self {
            reward,
            redemption_max,
            redemption_min,
            developers,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    fn validate(&self) -> Result<(), VaultError> {
        for (kind, value) in [
            (FeeKind::Reward, self.reward),
            (FeeKind::RedemptionMax, self.redemption_max),
            (FeeKind::RedemptionMin, self.redemption_min),
            (FeeKind::Developers, self.developers),
        ] {
            if value > FEE_MAX {
                return Err(VaultError::InvalidFee(format!(
                    "{:?} fee {} exceeds maximum {}",
                    kind, value, FEE_MAX
                )));
            }
        }
        if self.redemption_min > self.redemption_max {
            return Err(VaultError::InvalidFee(format!(
                "redemption minimum {} exceeds maximum {}",
                self.redemption_min, self.redemption_max
            )));
        }
        Ok(())
    }

    pub fn get(&self, kind: FeeKind) -> u32 {
        match kind {
            FeeKind::Reward => self.reward,
            FeeKind::RedemptionMax => self.redemption_max,
            FeeKind::RedemptionMin => self.redemption_min,
            FeeKind::Developers => self.developers,
        }
    }

    /// Change one fee. The schedule is unchanged if the result is invalid.
    pub fn set(&mut self, kind: FeeKind, value: u32) -> Result<(), VaultError> {
        let mut next = *self;
        match kind {
            FeeKind::Reward => next.reward = value,
            FeeKind::RedemptionMax => next.redemption_max = value,
            FeeKind::RedemptionMin => next.redemption_min = value,
            FeeKind::Developers => next.developers = value,
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Exit fee for a redemption with `remaining` seconds until unlock.
    pub fn redemption_fee_percent(&self, remaining: u64, max_redemption_time: u64) -> u32 {
        redemption_fee_percent(
            self.redemption_min,
            self.redemption_max,
            remaining,
            max_redemption_time,
        )
    }
}

/// Linear exit fee: `fee_min + (fee_max - fee_min) * min(remaining, horizon) / horizon`.
///
/// Non-increasing as `remaining` shrinks, and always within
/// `[fee_min, fee_max]`. A zero horizon charges `fee_max`.
pub fn redemption_fee_percent(fee_min: u32, fee_max: u32, remaining: u64, horizon: u64) -> u32 {
    if horizon == 0 || fee_max <= fee_min {
        return fee_max.max(fee_min);
    }
    let clamped = remaining.min(horizon);
    let spread = u128::from(fee_max - fee_min);
    let decay = spread * u128::from(clamped) / u128::from(horizon);
    // decay <= spread, which fits in u32.
    fee_min + decay as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DEFAULT_EPOCH_DURATION as D;

    fn schedule() -> FeeSchedule {
        FeeSchedule::new(40_000, 50_000, 10_000, 5_000).unwrap()
    }

    #[test]
    fn test_midpoint_fee() {
        assert_eq!(schedule().redemption_fee_percent(4 * D, 8 * D), 30_000);
    }

    #[test]
    fn test_fee_bounds() {
        let s = schedule();
        assert_eq!(s.redemption_fee_percent(0, 8 * D), 10_000);
        assert_eq!(s.redemption_fee_percent(8 * D, 8 * D), 50_000);
        assert_eq!(s.redemption_fee_percent(100 * D, 8 * D), 50_000);
    }

    #[test]
    fn test_fee_non_increasing_toward_unlock() {
        let s = schedule();
        let mut previous = u32::MAX;
        for remaining in (0..=9 * D).rev().step_by(86_400) {
            let fee = s.redemption_fee_percent(remaining, 8 * D);
            assert!(fee <= previous);
            assert!((10_000..=50_000).contains(&fee));
            previous = fee;
        }
    }

    #[test]
    fn test_set_rejects_fee_above_max() {
        let mut s = schedule();
        assert!(s.set(FeeKind::Reward, FEE_MAX + 1).is_err());
        assert_eq!(s.get(FeeKind::Reward), 40_000);
    }

    #[test]
    fn test_set_keeps_min_below_max() {
        let mut s = schedule();
        assert!(s.set(FeeKind::RedemptionMin, 60_000).is_err());
        assert!(s.set(FeeKind::RedemptionMax, 5_000).is_err());
        s.set(FeeKind::RedemptionMax, 80_000).unwrap();
        assert_eq!(s.get(FeeKind::RedemptionMax), 80_000);
    }

    #[test]
    fn test_flat_schedule() {
        assert_eq!(redemption_fee_percent(20_000, 20_000, 3, 10), 20_000);
        assert_eq!(redemption_fee_percent(10_000, 50_000, 3, 0), 50_000);
    }
}
