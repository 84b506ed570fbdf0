// crates/epochvault-economics/src/config.rs
//
// Vault configuration.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use epochvault_core::error::VaultError;
use epochvault_core::{Address, AssetId};

use crate::clock::DEFAULT_EPOCH_DURATION;
use crate::fees::FeeSchedule;

/// Seconds in a week.
const WEEK: u64 = 604_800;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] VaultError),
}

/// Fee percentages in parts per million.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeeConfig {
    #[serde(default = "default_reward_fee")]
    pub reward: u32,

    #[serde(default = "default_redemption_max")]
    pub redemption_max: u32,

    #[serde(default = "default_redemption_min")]
    pub redemption_min: u32,

    #[serde(default)]
    pub developers: u32,
}

fn default_reward_fee() -> u32 {
    40_000
}

fn default_redemption_max() -> u32 {
    50_000
}

fn default_redemption_min() -> u32 {
    10_000
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            reward: default_reward_fee(),
            redemption_max: default_redemption_max(),
            redemption_min: default_redemption_min(),
            developers: 0,
        }
    }
}

impl FeeConfig {
    pub fn schedule(&self) -> Result<FeeSchedule, VaultError> {
        FeeSchedule::new(
            self.reward,
            self.redemption_max,
            self.redemption_min,
            self.developers,
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VaultConfig {
    /// Epoch length in seconds.
    #[serde(default = "default_epoch_duration")]
    pub epoch_duration: u64,

    /// Remaining time at and beyond which the maximum exit fee applies.
    #[serde(default = "default_max_redemption_time")]
    pub max_redemption_time: u64,

    /// Lock length used by the in-memory position provider.
    #[serde(default = "default_lock_duration")]
    pub lock_duration: u64,

    #[serde(default)]
    pub fees: FeeConfig,

    #[serde(default = "default_owner")]
    pub owner: Address,

    /// Asset-ledger account the vault holds underlying and rewards in.
    #[serde(default = "default_custody")]
    pub custody: Address,

    #[serde(default = "default_underlying_asset")]
    pub underlying_asset: AssetId,

    /// Asset id the primary token is reported under to the fee sink.
    #[serde(default = "default_primary_asset")]
    pub primary_asset: AssetId,

    /// Namespace used when delegating the vault's votes.
    #[serde(default = "default_delegation_space")]
    pub delegation_space: String,

    /// Developers whitelisted for the deposit fee at startup.
    #[serde(default)]
    pub developers: Vec<Address>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_epoch_duration() -> u64 {
    DEFAULT_EPOCH_DURATION
}

fn default_max_redemption_time() -> u64 {
    17 * WEEK
}

fn default_lock_duration() -> u64 {
    16 * WEEK
}

fn default_owner() -> Address {
    Address::from_label("owner")
}

fn default_custody() -> Address {
    Address::from_label("vault")
}

fn default_underlying_asset() -> AssetId {
    Address::from_label("underlying")
}

fn default_primary_asset() -> AssetId {
    Address::from_label("primary")
}

fn default_delegation_space() -> String {
    "epochvault.eth".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            epoch_duration: default_epoch_duration(),
            max_redemption_time: default_max_redemption_time(),
            lock_duration: default_lock_duration(),
            fees: FeeConfig::default(),
            owner: default_owner(),
            custody: default_custody(),
            underlying_asset: default_underlying_asset(),
            primary_asset: default_primary_asset(),
            delegation_space: default_delegation_space(),
            developers: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl VaultConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: VaultConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// `InvalidConfig` for zero durations, zero accounts, or an empty
    /// delegation space; `InvalidFee` for an out-of-range fee schedule.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.epoch_duration == 0 {
            return Err(VaultError::InvalidConfig(
                "epoch_duration must be non-zero".to_string(),
            ));
        }
        if self.max_redemption_time == 0 {
            return Err(VaultError::InvalidConfig(
                "max_redemption_time must be non-zero".to_string(),
            ));
        }
        if self.lock_duration == 0 {
            return Err(VaultError::InvalidConfig(
                "lock_duration must be non-zero".to_string(),
            ));
        }
        for (name, address) in [
            ("owner", self.owner),
            ("custody", self.custody),
            ("underlying_asset", self.underlying_asset),
            ("primary_asset", self.primary_asset),
        ] {
            if address.is_zero() {
                return Err(VaultError::InvalidConfig(format!("{} must be non-zero", name)));
            }
        }
        if self.delegation_space.is_empty() {
            return Err(VaultError::InvalidConfig(
                "delegation_space must be non-empty".to_string(),
            ));
        }
        self.fees.schedule()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VaultConfig::default();
        config.validate().unwrap();
        assert_eq!(config.epoch_duration, 1_209_600);
        assert_eq!(config.fees.redemption_min, 10_000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = VaultConfig::from_toml(
            r#"
            epoch_duration = 1000
            owner = "alice"

            [fees]
            reward = 25000
            "#,
        )
        .unwrap();
        assert_eq!(config.epoch_duration, 1000);
        assert_eq!(config.owner, Address::from_label("alice"));
        assert_eq!(config.fees.reward, 25_000);
        assert_eq!(config.fees.redemption_max, 50_000);
        assert_eq!(config.custody, Address::from_label("vault"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            VaultConfig::from_toml("epoch_duration = 0"),
            Err(ConfigError::Invalid(VaultError::InvalidConfig(_)))
        ));
        assert!(matches!(
            VaultConfig::from_toml("[fees]\nredemption_min = 60000"),
            Err(ConfigError::Invalid(VaultError::InvalidFee(_)))
        ));
        assert!(matches!(
            VaultConfig::from_toml("epoch_duration = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            VaultConfig::load("/nonexistent/vault.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
