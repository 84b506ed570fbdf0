// crates/epochvault-economics/src/lib.rs
//
// epochvault-economics: epoch accounting, reward splitting, redemptions,
// futures, and term staking for the epochvault locked-asset pool.
//
// All amounts are u128 in the smallest token unit (10^18 per token). Fee
// percentages are parts per million over FEE_DENOMINATOR.

pub mod clock;
pub mod config;
pub mod custody;
pub mod epoch_store;
pub mod events;
pub mod fees;
pub mod futures;
pub mod redemption;
pub mod rewards;
pub mod staking;
pub mod token;
pub mod vault;

// Re-export key types for ergonomic access from downstream crates.
pub use clock::{EpochClock, DEFAULT_EPOCH_DURATION};
pub use config::{ConfigError, FeeConfig, VaultConfig};
pub use custody::Custody;
pub use epoch_store::{Epoch, EpochStore};
pub use events::{AuditRecord, EventLog, VaultEvent};
pub use fees::{redemption_fee_percent, FeeKind, FeeSchedule};
pub use futures::FuturesMinter;
pub use redemption::{quote_redemption, RedemptionBook, RedemptionEngine, RedemptionQuote};
pub use rewards::{split_reward, RewardDistributor, RewardSplit};
pub use staking::StakeManager;
pub use token::{
    apply_fee, format_percent, format_units, mul_div, parse_units, FEE_DENOMINATOR, FEE_MAX, UNIT,
};
pub use vault::{CallContext, RewardClaim, Vault};
