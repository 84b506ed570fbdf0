// crates/epochvault-cli/src/commands/mod.rs
//
// Subcommand implementations for the epochvault CLI.

pub mod epoch;
pub mod fee;
pub mod simulate;
