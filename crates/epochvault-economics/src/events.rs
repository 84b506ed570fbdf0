// crates/epochvault-economics/src/events.rs
//
// Audit trail for every state-changing vault operation.
//
// Each committed operation appends one or more `AuditRecord`s. Records are
// also emitted as structured `tracing` events so a subscriber sees them live.
// Records appended by an operation that later fails are discarded together
// with the rest of its draft state.

use serde::{Deserialize, Serialize};

use epochvault_core::receipt::FuturesKind;
use epochvault_core::traits::SnapshotId;
use epochvault_core::{Address, AssetId};

use crate::fees::FeeKind;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VaultEvent {
    Deposited {
        actor: Address,
        receiver: Address,
        assets: u128,
        minted: u128,
        developer: Option<Address>,
        developer_fee: u128,
    },
    Locked {
        actor: Address,
        amount: u128,
    },
    SnapshotTaken {
        actor: Address,
        snapshot_id: SnapshotId,
    },
    RewardClaimed {
        actor: Address,
        asset: AssetId,
        index: u64,
        amount: u128,
    },
    RewardSplit {
        actor: Address,
        asset: AssetId,
        amount: u128,
        fee: u128,
        snapshot_portion: u128,
        futures_portion: u128,
    },
    SnapshotRewardRedeemed {
        actor: Address,
        receiver: Address,
        reward_index: usize,
        asset: AssetId,
        amount: u128,
    },
    FuturesRewardsRedeemed {
        actor: Address,
        receiver: Address,
        burned: u128,
        payouts: Vec<(AssetId, u128)>,
    },
    FuturesMinted {
        actor: Address,
        receiver: Address,
        futures: FuturesKind,
        rounds: u64,
        amount: u128,
    },
    FuturesExchanged {
        actor: Address,
        receiver: Address,
        from: FuturesKind,
        amount: u128,
    },
    RedemptionInitiated {
        actor: Address,
        receiver: Address,
        lock_index: usize,
        assets: u128,
        fee: u128,
        post_fee: u128,
        rounds: u64,
    },
    Redeemed {
        actor: Address,
        receiver: Address,
        amount: u128,
    },
    Staked {
        actor: Address,
        receiver: Address,
        rounds: u8,
        assets: u128,
    },
    Unstaked {
        actor: Address,
        receiver: Address,
        assets: u128,
    },
    FeeSet {
        actor: Address,
        fee: FeeKind,
        value: u32,
    },
    DeveloperSet {
        actor: Address,
        developer: Address,
        allowed: bool,
    },
    PauseSet {
        actor: Address,
        paused: bool,
    },
    DelegationSpaceSet {
        actor: Address,
        space: String,
    },
    VoteDelegateSet {
        actor: Address,
        delegate: Address,
    },
    VoteDelegateCleared {
        actor: Address,
    },
    EmergencyExecutorSet {
        actor: Address,
        executor: Address,
    },
    EmergencyMigrationSet {
        actor: Address,
        recipient: Address,
        assets: Vec<AssetId>,
    },
    EmergencyMigrationExecuted {
        actor: Address,
        recipient: Address,
        transfers: Vec<(AssetId, u128)>,
    },
}

impl VaultEvent {
    pub fn name(&self) -> &'static str {
        match self {
            VaultEvent::Deposited { .. } => "deposited",
            VaultEvent::Locked { .. } => "locked",
            VaultEvent::SnapshotTaken { .. } => "snapshot_taken",
            VaultEvent::RewardClaimed { .. } => "reward_claimed",
            VaultEvent::RewardSplit { .. } => "reward_split",
            VaultEvent::SnapshotRewardRedeemed { .. } => "snapshot_reward_redeemed",
            VaultEvent::FuturesRewardsRedeemed { .. } => "futures_rewards_redeemed",
            VaultEvent::FuturesMinted { .. } => "futures_minted",
            VaultEvent::FuturesExchanged { .. } => "futures_exchanged",
            VaultEvent::RedemptionInitiated { .. } => "redemption_initiated",
            VaultEvent::Redeemed { .. } => "redeemed",
            VaultEvent::Staked { .. } => "staked",
            VaultEvent::Unstaked { .. } => "unstaked",
            VaultEvent::FeeSet { .. } => "fee_set",
            VaultEvent::DeveloperSet { .. } => "developer_set",
            VaultEvent::PauseSet { .. } => "pause_set",
            VaultEvent::DelegationSpaceSet { .. } => "delegation_space_set",
            VaultEvent::VoteDelegateSet { .. } => "vote_delegate_set",
            VaultEvent::VoteDelegateCleared { .. } => "vote_delegate_cleared",
            VaultEvent::EmergencyExecutorSet { .. } => "emergency_executor_set",
            VaultEvent::EmergencyMigrationSet { .. } => "emergency_migration_set",
            VaultEvent::EmergencyMigrationExecuted { .. } => "emergency_migration_executed",
        }
    }

    pub fn actor(&self) -> Address {
        match self {
            VaultEvent::Deposited { actor, .. }
            | VaultEvent::Locked { actor, .. }
            | VaultEvent::SnapshotTaken { actor, .. }
            | VaultEvent::RewardClaimed { actor, .. }
            | VaultEvent::RewardSplit { actor, .. }
            | VaultEvent::SnapshotRewardRedeemed { actor, .. }
            | VaultEvent::FuturesRewardsRedeemed { actor, .. }
            | VaultEvent::FuturesMinted { actor, .. }
            | VaultEvent::FuturesExchanged { actor, .. }
            | VaultEvent::RedemptionInitiated { actor, .. }
            | VaultEvent::Redeemed { actor, .. }
            | VaultEvent::Staked { actor, .. }
            | VaultEvent::Unstaked { actor, .. }
            | VaultEvent::FeeSet { actor, .. }
            | VaultEvent::DeveloperSet { actor, .. }
            | VaultEvent::PauseSet { actor, .. }
            | VaultEvent::DelegationSpaceSet { actor, .. }
            | VaultEvent::VoteDelegateSet { actor, .. }
            | VaultEvent::VoteDelegateCleared { actor }
            | VaultEvent::EmergencyExecutorSet { actor, .. }
            | VaultEvent::EmergencyMigrationSet { actor, .. }
            | VaultEvent::EmergencyMigrationExecuted { actor, .. } => *actor,
        }
    }
}

/// One entry in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Position in the log, starting at 0.
    pub seq: u64,
    /// Epoch, unlock time, or expiry the event concerns. For administrative
    /// events this is the epoch the call was made in.
    pub at: u64,
    pub event: VaultEvent,
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<AuditRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Nothing is logged here: the vault announces records
    /// with [`EventLog::announce`] once the call that emitted them commits.
    pub fn emit(&mut self, at: u64, event: VaultEvent) {
        let seq = self.records.len() as u64;
        self.records.push(AuditRecord { seq, at, event });
    }

    /// Log every record from position `from` onward at `info`.
    pub fn announce(&self, from: usize) {
        for record in self.records.iter().skip(from) {
            let fields = serde_json::to_string(&record.event)
                .unwrap_or_else(|e| format!("unserializable event: {}", e));
            tracing::info!(
                seq = record.seq,
                at = record.at,
                event = record.event.name(),
                actor = %record.event.actor(),
                fields = %fields,
                "vault event"
            );
        }
    }

    /// Drop every record from position `len` onward.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in `seq` order, one JSON object per line.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}
