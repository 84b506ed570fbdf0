// crates/epochvault-store/src/lib.rs
//
// epochvault-store: In-memory collaborators for the epochvault pool.
//
// Provides a generic id-keyed balance ledger, a checkpointing snapshot
// ledger for the primary token, a locking adapter with epoch-aligned unlock
// times, a Merkle reward source, a delegation registry, a recording fee sink,
// and `MemoryHost`, which bundles them behind the `Host` trait.
//
// These back the test suites and the simulator. Production deployments plug
// their own adapters into the same traits.

pub mod delegation;
pub mod fees;
pub mod host;
pub mod ledger;
pub mod positions;
pub mod rewards;
pub mod snapshot;

// Re-export key types for ergonomic access from downstream crates.
pub use delegation::MemoryDelegation;
pub use fees::MemoryFeeSink;
pub use host::{HostAccounts, MemoryHost};
pub use ledger::MemoryLedger;
pub use positions::MemoryPositions;
pub use rewards::MemoryRewardSource;
pub use snapshot::SnapshotToken;
