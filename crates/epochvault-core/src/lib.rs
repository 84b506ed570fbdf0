// crates/epochvault-core/src/lib.rs
//
// epochvault-core: Core types, error taxonomy, and collaborator traits for
// the epochvault locked-asset pool.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines account addresses, receipt kinds, the `VaultError` taxonomy,
// Merkle hashing helpers, and the capability traits through which the engine
// reaches every external ledger and service.

pub mod address;
pub mod crypto;
pub mod error;
pub mod receipt;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use epochvault_core::Address;`

pub use address::{Address, AssetId};
pub use error::{ErrorClass, VaultError};
pub use receipt::{FuturesKind, ReceiptKind};
pub use traits::{
    BalanceLedger, DelegationRegistry, FeeClass, FeeSink, Host, LockedPosition,
    MerkleRewardSource, PositionProvider, SnapshotId, SnapshotLedger, TokenId, FUNGIBLE,
};
