// crates/epochvault-cli/src/commands/epoch.rs
//
// `epochvault epoch --at <ts>`: the epoch key containing a timestamp.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use epochvault_core::error::VaultError;
use epochvault_economics::{EpochClock, VaultConfig};

use crate::output::{print_rows, OutputFormat};

#[derive(Debug, Args)]
pub struct EpochCmd {
    /// Unix timestamp in seconds.
    #[arg(long)]
    pub at: u64,
}

#[derive(Debug, Serialize, Tabled)]
pub struct EpochRow {
    #[tabled(rename = "Timestamp")]
    pub timestamp: u64,
    #[tabled(rename = "Epoch")]
    pub epoch: u64,
    #[tabled(rename = "Index")]
    pub index: u64,
    #[tabled(rename = "Elapsed")]
    pub elapsed: u64,
    #[tabled(rename = "Next Epoch")]
    pub next_epoch: u64,
    #[tabled(rename = "Duration")]
    pub duration: u64,
}

/// Compute the epoch row for `timestamp` under `config`'s epoch length.
pub fn epoch_row(timestamp: u64, config: &VaultConfig) -> Result<EpochRow, VaultError> {
    let clock = EpochClock::new(config.epoch_duration)?;
    let epoch = clock.epoch_at(timestamp);
    Ok(EpochRow {
        timestamp,
        epoch,
        index: epoch / clock.duration(),
        elapsed: timestamp - epoch,
        next_epoch: clock.epochs_ahead(timestamp, 1)?,
        duration: clock.duration(),
    })
}

pub fn run(
    cmd: &EpochCmd,
    config: &VaultConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let row = epoch_row(cmd.at, config)?;
    print_rows(&[row], format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_row() {
        let config = VaultConfig::default();
        let row = epoch_row(3 * 1_209_600 + 5, &config).unwrap();
        assert_eq!(row.epoch, 3 * 1_209_600);
        assert_eq!(row.index, 3);
        assert_eq!(row.elapsed, 5);
        assert_eq!(row.next_epoch, 4 * 1_209_600);
    }

    #[test]
    fn test_epoch_boundary_maps_to_itself() {
        let config = VaultConfig {
            epoch_duration: 100,
            ..VaultConfig::default()
        };
        let row = epoch_row(200, &config).unwrap();
        assert_eq!(row.epoch, 200);
        assert_eq!(row.elapsed, 0);
        assert_eq!(row.next_epoch, 300);
    }
}
