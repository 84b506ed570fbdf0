use thiserror::Error;

/// Broad category of a [`VaultError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed input: fix the arguments and call again.
    Validation,
    /// Valid input that the current state does not allow yet (or any more).
    State,
    /// Caller lacks the role, or the vault is in the wrong pause state.
    Access,
    /// An external ledger or service refused the operation.
    Collaborator,
    /// Arithmetic overflow or underflow. Always fatal to the call.
    Arithmetic,
}

/// Vault-wide error type.
///
/// Every failure is synchronous and aborts the whole operation: the vault
/// commits nothing when a call returns `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    #[error("Amount must be non-zero")]
    ZeroAmount,

    #[error("Address must be non-zero")]
    ZeroAddress,

    #[error("Array argument must not be empty")]
    EmptyArray,

    #[error("Mismatched array lengths: {0} vs {1}")]
    MismatchedArrayLengths(usize, usize),

    #[error("Invalid epoch: {0}")]
    InvalidEpoch(u64),

    /// Unknown lock index, out-of-range reward index, or a lock that has
    /// already matured.
    #[error("Invalid index: {0}")]
    InvalidIndices(usize),

    #[error("Invalid fee: {0}")]
    InvalidFee(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Snapshot rewards already redeemed for epoch {epoch}, reward index {index}")]
    AlreadyRedeemed { epoch: u64, index: usize },

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error(
        "Insufficient redemption allowance at unlock time {unlock_time}: requested {requested}, available {available}"
    )]
    InsufficientRedemptionAllowance {
        unlock_time: u64,
        requested: u128,
        available: u128,
    },

    #[error("Lock at {unlock_time} has not expired (now {now})")]
    BeforeLockExpiry { unlock_time: u64, now: u64 },

    #[error("Stake expiring at {expiry} has not expired (now {now})")]
    BeforeStakingExpiry { expiry: u64, now: u64 },

    #[error("Exchange window for epoch {epoch} has closed (current epoch {current})")]
    PastExchangePeriod { epoch: u64, current: u64 },

    #[error("No snapshot taken for epoch {0}")]
    SnapshotRequired(u64),

    #[error("Reward leaf {index} already claimed")]
    AlreadyClaimed { index: u64 },

    #[error("Merkle proof does not match the published root")]
    InvalidProof,

    #[error("Emergency migration unavailable: {0}")]
    MigrationUnavailable(String),

    #[error("Caller is not authorized")]
    NotAuthorized,

    #[error("Vault is paused")]
    Paused,

    #[error("Vault is not paused")]
    NotPaused,

    #[error("Pause state is already set to the requested value")]
    InvalidPauseState,

    /// An external ledger rejected a mint, burn, or transfer.
    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Arithmetic underflow in {0}")]
    Underflow(&'static str),
}

impl VaultError {
    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            VaultError::ZeroAmount
            | VaultError::ZeroAddress
            | VaultError::EmptyArray
            | VaultError::MismatchedArrayLengths(..)
            | VaultError::InvalidEpoch(_)
            | VaultError::InvalidIndices(_)
            | VaultError::InvalidFee(_)
            | VaultError::InvalidConfig(_) => ErrorClass::Validation,

            VaultError::AlreadyRedeemed { .. }
            | VaultError::InsufficientBalance(_)
            | VaultError::InsufficientRedemptionAllowance { .. }
            | VaultError::BeforeLockExpiry { .. }
            | VaultError::BeforeStakingExpiry { .. }
            | VaultError::PastExchangePeriod { .. }
            | VaultError::SnapshotRequired(_)
            | VaultError::AlreadyClaimed { .. }
            | VaultError::InvalidProof
            | VaultError::MigrationUnavailable(_) => ErrorClass::State,

            VaultError::NotAuthorized
            | VaultError::Paused
            | VaultError::NotPaused
            | VaultError::InvalidPauseState => ErrorClass::Access,

            VaultError::Ledger(_) => ErrorClass::Collaborator,

            VaultError::Overflow(_) | VaultError::Underflow(_) => ErrorClass::Arithmetic,
        }
    }
}
