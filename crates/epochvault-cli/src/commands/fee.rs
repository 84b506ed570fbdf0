// crates/epochvault-cli/src/commands/fee.rs
//
// `epochvault fee --remaining <secs>`: quote the exit fee and futures
// rounds for a redemption with the given time left on its lock.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use epochvault_core::error::VaultError;
use epochvault_economics::{
    format_percent, format_units, parse_units, quote_redemption, EpochClock, VaultConfig,
};

use crate::output::{print_rows, OutputFormat};

#[derive(Debug, Args)]
pub struct FeeCmd {
    /// Seconds until the position unlocks.
    #[arg(long)]
    pub remaining: u64,

    /// Token amount to redeem, in whole tokens (e.g. "1.5").
    #[arg(long, default_value = "1")]
    pub assets: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct FeeRow {
    #[tabled(rename = "Remaining (s)")]
    pub remaining: u64,
    #[tabled(rename = "Fee")]
    pub fee_percent: String,
    #[tabled(rename = "Fee (ppm)")]
    pub fee_ppm: u32,
    #[tabled(rename = "Assets")]
    pub assets: String,
    #[tabled(rename = "Fee Amount")]
    pub fee: String,
    #[tabled(rename = "Post Fee")]
    pub post_fee: String,
    #[tabled(rename = "Futures Rounds")]
    pub rounds: u64,
}

pub fn fee_row(cmd: &FeeCmd, config: &VaultConfig) -> Result<FeeRow, VaultError> {
    let clock = EpochClock::new(config.epoch_duration)?;
    let fees = config.fees.schedule()?;
    let assets = parse_units(&cmd.assets)?;
    // Unlock time relative to a zero clock gives exactly `remaining`.
    let quote = quote_redemption(
        &clock,
        &fees,
        config.max_redemption_time,
        cmd.remaining,
        assets,
        0,
    )?;
    Ok(FeeRow {
        remaining: quote.remaining,
        fee_percent: format_percent(quote.fee_percent),
        fee_ppm: quote.fee_percent,
        assets: format_units(quote.assets),
        fee: format_units(quote.fee),
        post_fee: format_units(quote.post_fee),
        rounds: quote.rounds,
    })
}

pub fn run(
    cmd: &FeeCmd,
    config: &VaultConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let row = fee_row(cmd, config)?;
    print_rows(&[row], format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(remaining: u64, assets: &str) -> FeeCmd {
        FeeCmd {
            remaining,
            assets: assets.to_string(),
        }
    }

    #[test]
    fn test_fee_at_and_beyond_horizon_is_max() {
        let config = VaultConfig::default();
        let at_horizon = fee_row(&cmd(config.max_redemption_time, "1"), &config).unwrap();
        let beyond = fee_row(&cmd(10 * config.max_redemption_time, "1"), &config).unwrap();
        assert_eq!(at_horizon.fee_ppm, 50_000);
        assert_eq!(beyond.fee_ppm, 50_000);
    }

    #[test]
    fn test_fee_with_nothing_remaining_is_min() {
        let config = VaultConfig::default();
        let row = fee_row(&cmd(0, "2"), &config).unwrap();
        assert_eq!(row.fee_ppm, 10_000);
        assert_eq!(row.rounds, 0);
        assert_eq!(row.fee, format_units(2 * epochvault_economics::UNIT / 100));
    }

    #[test]
    fn test_rounds_count_whole_epochs() {
        let config = VaultConfig::default();
        let row = fee_row(&cmd(4 * config.epoch_duration + 1, "1"), &config).unwrap();
        assert_eq!(row.rounds, 4);
    }

    #[test]
    fn test_bad_amount_rejected() {
        let config = VaultConfig::default();
        assert!(fee_row(&cmd(0, "lots"), &config).is_err());
    }
}
