// crates/epochvault-core/src/receipt.rs
//
// Receipt kinds issued by the vault.
//
// Every receipt ledger is keyed by a timestamp id:
//   - DeferredClaim: id = unlock time of the position it draws on
//   - Stake:         id = expiry epoch
//   - Futures:       id = the epoch whose rewards or votes it entitles

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two flavours of forward-dated entitlement receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FuturesKind {
    /// Entitles the holder to the epoch's vote allocation.
    Vote,
    /// Entitles the holder to the epoch's futures reward share.
    Reward,
}

impl FuturesKind {
    /// The kind a receipt becomes when exchanged.
    pub fn other(self) -> Self {
        match self {
            FuturesKind::Vote => FuturesKind::Reward,
            FuturesKind::Reward => FuturesKind::Vote,
        }
    }
}

impl fmt::Display for FuturesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuturesKind::Vote => write!(f, "vote"),
            FuturesKind::Reward => write!(f, "reward"),
        }
    }
}

/// Selects one of the vault's receipt ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReceiptKind {
    DeferredClaim,
    Stake,
    Futures(FuturesKind),
}

impl fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptKind::DeferredClaim => write!(f, "deferred-claim"),
            ReceiptKind::Stake => write!(f, "stake"),
            ReceiptKind::Futures(kind) => write!(f, "{}-futures", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_is_involution() {
        assert_eq!(FuturesKind::Vote.other(), FuturesKind::Reward);
        assert_eq!(FuturesKind::Reward.other().other(), FuturesKind::Reward);
    }

    #[test]
    fn test_display() {
        assert_eq!(ReceiptKind::Futures(FuturesKind::Vote).to_string(), "vote-futures");
        assert_eq!(ReceiptKind::DeferredClaim.to_string(), "deferred-claim");
    }
}
