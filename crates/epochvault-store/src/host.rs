// crates/epochvault-store/src/host.rs
//
// `MemoryHost`: every in-memory collaborator behind the `Host` trait.

use epochvault_core::receipt::{FuturesKind, ReceiptKind};
use epochvault_core::traits::{Host, TokenId};
use epochvault_core::{Address, AssetId};

use crate::delegation::MemoryDelegation;
use crate::fees::MemoryFeeSink;
use crate::ledger::MemoryLedger;
use crate::positions::MemoryPositions;
use crate::rewards::MemoryRewardSource;
use crate::snapshot::SnapshotToken;

/// Accounts the in-memory collaborators hold funds under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostAccounts {
    /// Custody account for locked underlying.
    pub locker: Address,
    /// Account fees are moved to.
    pub fee_sink: Address,
}

impl Default for HostAccounts {
    fn default() -> Self {
        Self {
            locker: Address::from_label("locker"),
            fee_sink: Address::from_label("fee-sink"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryHost {
    primary: SnapshotToken,
    deferred_claims: MemoryLedger<TokenId>,
    stakes: MemoryLedger<TokenId>,
    vote_futures: MemoryLedger<TokenId>,
    reward_futures: MemoryLedger<TokenId>,
    assets: MemoryLedger<AssetId>,
    positions: MemoryPositions,
    rewards: MemoryRewardSource,
    delegation: MemoryDelegation,
    fees: MemoryFeeSink,
}

impl MemoryHost {
    /// Create a host whose locking adapter locks for `lock_duration` seconds
    /// from the start of the current `epoch_duration`-long epoch.
    pub fn new(epoch_duration: u64, lock_duration: u64) -> Self {
        Self::with_accounts(epoch_duration, lock_duration, HostAccounts::default())
    }

    pub fn with_accounts(epoch_duration: u64, lock_duration: u64, accounts: HostAccounts) -> Self {
        Self {
            primary: SnapshotToken::new(),
            deferred_claims: MemoryLedger::new("deferred-claims"),
            stakes: MemoryLedger::new("stakes"),
            vote_futures: MemoryLedger::new("vote-futures"),
            reward_futures: MemoryLedger::new("reward-futures"),
            assets: MemoryLedger::new("assets"),
            positions: MemoryPositions::new(epoch_duration, lock_duration, accounts.locker),
            rewards: MemoryRewardSource::new(),
            delegation: MemoryDelegation::new(),
            fees: MemoryFeeSink::new(accounts.fee_sink),
        }
    }

    /// Concrete reward source, for publishing roots.
    pub fn reward_source(&mut self) -> &mut MemoryRewardSource {
        &mut self.rewards
    }
}

impl Host for MemoryHost {
    type Primary = SnapshotToken;
    type Receipts = MemoryLedger<TokenId>;
    type Assets = MemoryLedger<AssetId>;
    type Positions = MemoryPositions;
    type Rewards = MemoryRewardSource;
    type Delegation = MemoryDelegation;
    type Fees = MemoryFeeSink;

    fn primary(&self) -> &Self::Primary {
        &self.primary
    }

    fn primary_mut(&mut self) -> &mut Self::Primary {
        &mut self.primary
    }

    fn receipts(&self, kind: ReceiptKind) -> &Self::Receipts {
        match kind {
            ReceiptKind::DeferredClaim => &self.deferred_claims,
            ReceiptKind::Stake => &self.stakes,
            ReceiptKind::Futures(FuturesKind::Vote) => &self.vote_futures,
            ReceiptKind::Futures(FuturesKind::Reward) => &self.reward_futures,
        }
    }

    fn receipts_mut(&mut self, kind: ReceiptKind) -> &mut Self::Receipts {
        match kind {
            ReceiptKind::DeferredClaim => &mut self.deferred_claims,
            ReceiptKind::Stake => &mut self.stakes,
            ReceiptKind::Futures(FuturesKind::Vote) => &mut self.vote_futures,
            ReceiptKind::Futures(FuturesKind::Reward) => &mut self.reward_futures,
        }
    }

    fn assets(&self) -> &Self::Assets {
        &self.assets
    }

    fn assets_mut(&mut self) -> &mut Self::Assets {
        &mut self.assets
    }

    fn positions(&self) -> &Self::Positions {
        &self.positions
    }

    fn positions_mut(&mut self) -> &mut Self::Positions {
        &mut self.positions
    }

    fn reward_source_mut(&mut self) -> &mut Self::Rewards {
        &mut self.rewards
    }

    fn delegation(&self) -> &Self::Delegation {
        &self.delegation
    }

    fn delegation_mut(&mut self) -> &mut Self::Delegation {
        &mut self.delegation
    }

    fn fee_sink(&self) -> &Self::Fees {
        &self.fees
    }

    fn fee_sink_mut(&mut self) -> &mut Self::Fees {
        &mut self.fees
    }
}
