// crates/epochvault-cli/src/main.rs
//
// CLI entrypoint for the epochvault tools.
//
// Provides subcommands for computing epoch keys, quoting exit fees, and
// replaying JSON scripts of vault calls against the in-memory host.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::epoch::EpochCmd;
use commands::fee::FeeCmd;
use commands::simulate::SimulateCmd;
use epochvault_economics::VaultConfig;
use output::OutputFormat;

/// epochvault CLI: epoch math, fee quotes, and vault simulations.
#[derive(Parser, Debug)]
#[command(
    name = "epochvault",
    version = "0.1.0",
    about = "epochvault CLI for the locked-asset vault: epochs, fees, and simulations"
)]
struct Cli {
    /// Path to the TOML vault configuration.
    #[arg(long, global = true, default_value = "epochvault.toml")]
    config: String,

    /// Emit JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the epoch key containing a timestamp.
    Epoch(EpochCmd),

    /// Quote the exit fee for a redemption with the given time remaining.
    Fee(FeeCmd),

    /// Replay a JSON script of vault calls and print the resulting events.
    Simulate(SimulateCmd),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = VaultConfig::load(&cli.config);
    let default_level = match &loaded {
        Ok(config) => config.log_level.clone(),
        Err(_) => "info".to_string(),
    };

    // Logs go to stderr so JSON on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match loaded {
        Ok(config) => {
            tracing::debug!("Loaded configuration from {}", cli.config);
            config
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                cli.config,
                e
            );
            VaultConfig::default()
        }
    };

    let format = OutputFormat::from_flag(cli.json);
    match &cli.command {
        Commands::Epoch(cmd) => commands::epoch::run(cmd, &config, format)?,
        Commands::Fee(cmd) => commands::fee::run(cmd, &config, format)?,
        Commands::Simulate(cmd) => commands::simulate::run(cmd, &config, format)?,
    }

    Ok(())
}
