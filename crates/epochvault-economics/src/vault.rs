// crates/epochvault-economics/src/vault.rs
//
// The vault: one entry point per user or administrator action.
//
// Every mutating call runs against a draft copy of the whole vault,
// including its `Host`. The draft replaces the live state only when the call
// returns `Ok`, so a failing call leaves every ledger, record, and the audit
// log exactly as they were. Audit records are logged only after the commit.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use epochvault_core::error::VaultError;
use epochvault_core::receipt::{FuturesKind, ReceiptKind};
use epochvault_core::traits::{
    BalanceLedger, DelegationRegistry, Host, MerkleRewardSource, PositionProvider, SnapshotId,
    FUNGIBLE,
};
use epochvault_core::{Address, AssetId};

use crate::clock::EpochClock;
use crate::config::VaultConfig;
use crate::custody::Custody;
use crate::epoch_store::Epoch;
use crate::events::{AuditRecord, EventLog, VaultEvent};
use crate::fees::{FeeKind, FeeSchedule};
use crate::redemption::{RedemptionBook, RedemptionEngine, RedemptionQuote};
use crate::rewards::{RewardDistributor, RewardSplit};
use crate::staking::StakeManager;
use crate::token::{mul_div, FEE_DENOMINATOR};

/// Who is calling, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: Address, now: u64) -> Self {
        Self { caller, now }
    }
}

/// One leaf to claim from the Merkle reward source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaim {
    pub asset: AssetId,
    pub index: u64,
    pub amount: u128,
    #[serde(default)]
    pub proof: Vec<[u8; 32]>,
}

#[derive(Debug, Clone, Default)]
struct EmergencyState {
    executor: Option<Address>,
    recipient: Option<Address>,
    assets: Vec<AssetId>,
    executed: bool,
}

#[derive(Clone)]
pub struct Vault<H: Host> {
    config: VaultConfig,
    clock: EpochClock,
    fees: FeeSchedule,
    owner: Address,
    paused: bool,
    developers: BTreeSet<Address>,
    delegation_space: String,
    emergency: EmergencyState,
    custody: Custody,
    distributor: RewardDistributor,
    redemptions: RedemptionEngine,
    staking: StakeManager,
    log: EventLog,
    host: H,
}

impl<H: Host> Vault<H> {
    /// # Errors
    /// Whatever `VaultConfig::validate` rejects.
    pub fn new(config: VaultConfig, host: H) -> Result<Self, VaultError> {
        config.validate()?;
        let clock = EpochClock::new(config.epoch_duration)?;
        let fees = config.fees.schedule()?;

        tracing::info!(
            owner = %config.owner,
            epoch_duration = config.epoch_duration,
            max_redemption_time = config.max_redemption_time,
            "vault initialised"
        );

        Ok(Self {
            clock,
            fees,
            owner: config.owner,
            paused: false,
            developers: config.developers.iter().copied().collect(),
            delegation_space: config.delegation_space.clone(),
            emergency: EmergencyState::default(),
            custody: Custody::new(config.custody, config.underlying_asset),
            distributor: RewardDistributor::new(clock, config.custody),
            redemptions: RedemptionEngine::new(
                clock,
                config.max_redemption_time,
                config.primary_asset,
            ),
            staking: StakeManager::new(clock),
            log: EventLog::new(),
            host,
            config,
        })
    }

    fn transact<T>(
        &mut self,
        op: &'static str,
        ctx: &CallContext,
        f: impl FnOnce(&mut Self) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        // The journal only grows, so it is moved into the draft rather than
        // cloned, and cut back to `committed` records on failure.
        let log = std::mem::take(&mut self.log);
        let committed = log.len();
        let mut draft = self.clone();
        draft.log = log;
        match f(&mut draft) {
            Ok(value) => {
                *self = draft;
                self.log.announce(committed);
                Ok(value)
            }
            Err(err) => {
                let mut log = std::mem::take(&mut draft.log);
                log.truncate(committed);
                self.log = log;
                tracing::warn!(
                    op,
                    caller = %ctx.caller,
                    now = ctx.now,
                    class = ?err.class(),
                    error = %err,
                    "operation rejected"
                );
                Err(err)
            }
        }
    }

    fn when_not_paused(&self) -> Result<(), VaultError> {
        if self.paused {
            return Err(VaultError::Paused);
        }
        Ok(())
    }

    fn when_paused(&self) -> Result<(), VaultError> {
        if !self.paused {
            return Err(VaultError::NotPaused);
        }
        Ok(())
    }

    fn only_owner(&self, ctx: &CallContext) -> Result<(), VaultError> {
        if ctx.caller != self.owner {
            return Err(VaultError::NotAuthorized);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Deposits and locking
    // ---------------------------------------------------------------------

    /// Deposit `assets` of underlying from the caller and mint primary
    /// tokens to `receiver`. A whitelisted `developer` receives the
    /// developer fee out of the minted amount. Returns the amount minted to
    /// `receiver`.
    pub fn deposit(
        &mut self,
        ctx: CallContext,
        assets: u128,
        receiver: Address,
        developer: Option<Address>,
    ) -> Result<u128, VaultError> {
        self.transact("deposit", &ctx, |v| {
            v.when_not_paused()?;
            if assets == 0 {
                return Err(VaultError::ZeroAmount);
            }
            receiver.require_non_zero()?;

            v.distributor
                .take_epoch_snapshot(&mut v.host, &mut v.log, &ctx.caller, ctx.now)?;
            v.custody.receive(&mut v.host, &ctx.caller, assets)?;

            let developer = developer.filter(|d| v.developers.contains(d));
            let developer_fee = match developer {
                Some(_) => mul_div(
                    assets,
                    u128::from(v.fees.get(FeeKind::Developers)),
                    FEE_DENOMINATOR,
                )?,
                None => 0,
            };
            let minted = assets - developer_fee;

            v.host.primary_mut().mint(&receiver, FUNGIBLE, minted)?;
            if let Some(dev) = developer {
                if developer_fee > 0 {
                    v.host.primary_mut().mint(&dev, FUNGIBLE, developer_fee)?;
                }
            }

            let epoch = v.clock.epoch_at(ctx.now);
            let outstanding = v.redemptions.book().total();
            v.custody
                .relock(&mut v.host, &mut v.log, outstanding, &ctx.caller, epoch, ctx.now)?;

            v.log.emit(
                epoch,
                VaultEvent::Deposited {
                    actor: ctx.caller,
                    receiver,
                    assets,
                    minted,
                    developer,
                    developer_fee,
                },
            );
            Ok(minted)
        })
    }

    /// Release matured locks and relock everything not reserved for
    /// outstanding redemptions. Returns the amount locked.
    pub fn lock(&mut self, ctx: CallContext) -> Result<u128, VaultError> {
        self.transact("lock", &ctx, |v| {
            v.when_not_paused()?;
            v.custody.release_expired(&mut v.host, ctx.now)?;
            let epoch = v.clock.epoch_at(ctx.now);
            let outstanding = v.redemptions.book().total();
            v.custody
                .relock(&mut v.host, &mut v.log, outstanding, &ctx.caller, epoch, ctx.now)
        })
    }

    /// Snapshot the primary ledger for the current epoch if not yet done.
    pub fn take_epoch_snapshot(&mut self, ctx: CallContext) -> Result<SnapshotId, VaultError> {
        self.transact("take_epoch_snapshot", &ctx, |v| {
            v.when_not_paused()?;
            v.distributor
                .take_epoch_snapshot(&mut v.host, &mut v.log, &ctx.caller, ctx.now)
        })
    }

    // ---------------------------------------------------------------------
    // Rewards
    // ---------------------------------------------------------------------

    /// Claim reward leaves for the vault from the Merkle reward source and
    /// split them into the current epoch.
    pub fn claim_rewards(
        &mut self,
        ctx: CallContext,
        claims: &[RewardClaim],
    ) -> Result<Vec<RewardSplit>, VaultError> {
        self.transact("claim_rewards", &ctx, |v| {
            v.when_not_paused()?;
            if claims.is_empty() {
                return Err(VaultError::EmptyArray);
            }
            let epoch = v.clock.epoch_at(ctx.now);
            if v.distributor.current_snapshot_id(ctx.now) == 0 {
                return Err(VaultError::SnapshotRequired(epoch));
            }

            let custody = v.custody.account();
            let mut assets = Vec::with_capacity(claims.len());
            let mut amounts = Vec::with_capacity(claims.len());
            for claim in claims {
                let received = v.host.reward_source_mut().claim(
                    &claim.asset,
                    claim.index,
                    &custody,
                    claim.amount,
                    &claim.proof,
                )?;
                v.host.assets_mut().mint(&custody, claim.asset, received)?;
                v.log.emit(
                    epoch,
                    VaultEvent::RewardClaimed {
                        actor: ctx.caller,
                        asset: claim.asset,
                        index: claim.index,
                        amount: received,
                    },
                );
                assets.push(claim.asset);
                amounts.push(received);
            }

            let fee_percent = v.fees.get(FeeKind::Reward);
            v.distributor.claim_and_split(
                &mut v.host,
                &mut v.log,
                &assets,
                &amounts,
                fee_percent,
                &ctx.caller,
                ctx.now,
            )
        })
    }

    /// Split a reward batch the caller pays in directly.
    pub fn claim_and_split(
        &mut self,
        ctx: CallContext,
        assets: &[AssetId],
        amounts: &[u128],
    ) -> Result<Vec<RewardSplit>, VaultError> {
        self.transact("claim_and_split", &ctx, |v| {
            v.when_not_paused()?;
            if assets.is_empty() {
                return Err(VaultError::EmptyArray);
            }
            if assets.len() != amounts.len() {
                return Err(VaultError::MismatchedArrayLengths(assets.len(), amounts.len()));
            }
            let custody = v.custody.account();
            for (asset, amount) in assets.iter().zip(amounts) {
                if *amount > 0 {
                    v.host
                        .assets_mut()
                        .transfer_from(&ctx.caller, &custody, *asset, *amount)?;
                }
            }
            let fee_percent = v.fees.get(FeeKind::Reward);
            v.distributor.claim_and_split(
                &mut v.host,
                &mut v.log,
                assets,
                amounts,
                fee_percent,
                &ctx.caller,
                ctx.now,
            )
        })
    }

    pub fn redeem_snapshot_reward(
        &mut self,
        ctx: CallContext,
        epoch: u64,
        reward_index: usize,
        receiver: Address,
    ) -> Result<u128, VaultError> {
        self.transact("redeem_snapshot_reward", &ctx, |v| {
            v.when_not_paused()?;
            v.distributor.redeem_snapshot_reward(
                &mut v.host,
                &mut v.log,
                epoch,
                reward_index,
                &ctx.caller,
                &receiver,
            )
        })
    }

    pub fn redeem_snapshot_rewards(
        &mut self,
        ctx: CallContext,
        epoch: u64,
        reward_indexes: &[usize],
        receiver: Address,
    ) -> Result<Vec<u128>, VaultError> {
        self.transact("redeem_snapshot_rewards", &ctx, |v| {
            v.when_not_paused()?;
            v.distributor.redeem_snapshot_rewards(
                &mut v.host,
                &mut v.log,
                epoch,
                reward_indexes,
                &ctx.caller,
                &receiver,
            )
        })
    }

    pub fn redeem_futures_rewards(
        &mut self,
        ctx: CallContext,
        epoch: u64,
        receiver: Address,
    ) -> Result<Vec<(AssetId, u128)>, VaultError> {
        self.transact("redeem_futures_rewards", &ctx, |v| {
            v.when_not_paused()?;
            v.distributor.redeem_futures_rewards(
                &mut v.host,
                &mut v.log,
                epoch,
                &ctx.caller,
                &receiver,
                ctx.now,
            )
        })
    }

    // ---------------------------------------------------------------------
    // Redemptions and futures
    // ---------------------------------------------------------------------

    pub fn initiate_redemptions(
        &mut self,
        ctx: CallContext,
        lock_indexes: &[usize],
        kind: FuturesKind,
        assets: &[u128],
        receiver: Address,
    ) -> Result<Vec<RedemptionQuote>, VaultError> {
        self.transact("initiate_redemptions", &ctx, |v| {
            v.when_not_paused()?;
            v.distributor
                .take_epoch_snapshot(&mut v.host, &mut v.log, &ctx.caller, ctx.now)?;
            v.redemptions.initiate_redemptions(
                &mut v.host,
                &mut v.log,
                &v.fees,
                lock_indexes,
                kind,
                assets,
                &receiver,
                &ctx.caller,
                ctx.now,
            )
        })
    }

    /// Settle matured deferred claims. Returns the underlying paid.
    pub fn redeem(
        &mut self,
        ctx: CallContext,
        unlock_times: &[u64],
        assets: &[u128],
        receiver: Address,
    ) -> Result<u128, VaultError> {
        self.transact("redeem", &ctx, |v| {
            v.when_not_paused()?;
            let paid = v.redemptions.redeem(
                &mut v.host,
                &mut v.log,
                &v.custody,
                unlock_times,
                assets,
                &receiver,
                &ctx.caller,
                ctx.now,
            )?;
            let epoch = v.clock.epoch_at(ctx.now);
            let outstanding = v.redemptions.book().total();
            v.custody
                .relock(&mut v.host, &mut v.log, outstanding, &ctx.caller, epoch, ctx.now)?;
            Ok(paid)
        })
    }

    pub fn exchange_futures(
        &mut self,
        ctx: CallContext,
        epoch: u64,
        amount: u128,
        receiver: Address,
        from: FuturesKind,
    ) -> Result<(), VaultError> {
        self.transact("exchange_futures", &ctx, |v| {
            v.when_not_paused()?;
            v.redemptions.exchange_futures(
                &mut v.host,
                &mut v.log,
                epoch,
                amount,
                &receiver,
                from,
                &ctx.caller,
                ctx.now,
            )
        })
    }

    // ---------------------------------------------------------------------
    // Staking
    // ---------------------------------------------------------------------

    /// Returns the stake expiry.
    pub fn stake(
        &mut self,
        ctx: CallContext,
        rounds: u8,
        kind: FuturesKind,
        assets: u128,
        receiver: Address,
    ) -> Result<u64, VaultError> {
        self.transact("stake", &ctx, |v| {
            v.when_not_paused()?;
            v.distributor
                .take_epoch_snapshot(&mut v.host, &mut v.log, &ctx.caller, ctx.now)?;
            v.staking.stake(
                &mut v.host,
                &mut v.log,
                rounds,
                kind,
                assets,
                &receiver,
                &ctx.caller,
                ctx.now,
            )
        })
    }

    pub fn unstake(
        &mut self,
        ctx: CallContext,
        expiry: u64,
        assets: u128,
        receiver: Address,
    ) -> Result<(), VaultError> {
        self.transact("unstake", &ctx, |v| {
            v.when_not_paused()?;
            v.staking.unstake(
                &mut v.host,
                &mut v.log,
                expiry,
                assets,
                &receiver,
                &ctx.caller,
                ctx.now,
            )
        })
    }

    // ---------------------------------------------------------------------
    // Administration
    // ---------------------------------------------------------------------

    pub fn set_fee(&mut self, ctx: CallContext, kind: FeeKind, value: u32) -> Result<(), VaultError> {
        self.transact("set_fee", &ctx, |v| {
            v.only_owner(&ctx)?;
            v.fees.set(kind, value)?;
            let epoch = v.clock.epoch_at(ctx.now);
            v.log.emit(
                epoch,
                VaultEvent::FeeSet {
                    actor: ctx.caller,
                    fee: kind,
                    value,
                },
            );
            Ok(())
        })
    }

    pub fn set_developer(
        &mut self,
        ctx: CallContext,
        developer: Address,
        allowed: bool,
    ) -> Result<(), VaultError> {
        self.transact("set_developer", &ctx, |v| {
            v.only_owner(&ctx)?;
            developer.require_non_zero()?;
            if allowed {
                v.developers.insert(developer);
            } else {
                v.developers.remove(&developer);
            }
            let epoch = v.clock.epoch_at(ctx.now);
            v.log.emit(
                epoch,
                VaultEvent::DeveloperSet {
                    actor: ctx.caller,
                    developer,
                    allowed,
                },
            );
            Ok(())
        })
    }

    pub fn set_pause_state(&mut self, ctx: CallContext, paused: bool) -> Result<(), VaultError> {
        self.transact("set_pause_state", &ctx, |v| {
            v.only_owner(&ctx)?;
            if v.paused == paused {
                return Err(VaultError::InvalidPauseState);
            }
            v.paused = paused;
            let epoch = v.clock.epoch_at(ctx.now);
            v.log.emit(
                epoch,
                VaultEvent::PauseSet {
                    actor: ctx.caller,
                    paused,
                },
            );
            Ok(())
        })
    }

    pub fn set_delegation_space(&mut self, ctx: CallContext, space: &str) -> Result<(), VaultError> {
        self.transact("set_delegation_space", &ctx, |v| {
            v.only_owner(&ctx)?;
            if space.is_empty() {
                return Err(VaultError::InvalidConfig(
                    "delegation space must be non-empty".to_string(),
                ));
            }
            v.delegation_space = space.to_string();
            let epoch = v.clock.epoch_at(ctx.now);
            v.log.emit(
                epoch,
                VaultEvent::DelegationSpaceSet {
                    actor: ctx.caller,
                    space: space.to_string(),
                },
            );
            Ok(())
        })
    }

    /// Delegate the vault's votes in the current delegation space.
    pub fn set_vote_delegate(&mut self, ctx: CallContext, delegate: Address) -> Result<(), VaultError> {
        self.transact("set_vote_delegate", &ctx, |v| {
            v.only_owner(&ctx)?;
            delegate.require_non_zero()?;
            let custody = v.custody.account();
            v.host
                .delegation_mut()
                .set_delegate(&custody, &v.delegation_space, &delegate)?;
            let epoch = v.clock.epoch_at(ctx.now);
            v.log.emit(
                epoch,
                VaultEvent::VoteDelegateSet {
                    actor: ctx.caller,
                    delegate,
                },
            );
            Ok(())
        })
    }

    pub fn clear_vote_delegate(&mut self, ctx: CallContext) -> Result<(), VaultError> {
        self.transact("clear_vote_delegate", &ctx, |v| {
            v.only_owner(&ctx)?;
            let custody = v.custody.account();
            v.host
                .delegation_mut()
                .clear_delegate(&custody, &v.delegation_space)?;
            let epoch = v.clock.epoch_at(ctx.now);
            v.log
                .emit(epoch, VaultEvent::VoteDelegateCleared { actor: ctx.caller });
            Ok(())
        })
    }

    pub fn set_emergency_executor(
        &mut self,
        ctx: CallContext,
        executor: Address,
    ) -> Result<(), VaultError> {
        self.transact("set_emergency_executor", &ctx, |v| {
            v.only_owner(&ctx)?;
            v.when_paused()?;
            executor.require_non_zero()?;
            v.emergency.executor = Some(executor);
            let epoch = v.clock.epoch_at(ctx.now);
            v.log.emit(
                epoch,
                VaultEvent::EmergencyExecutorSet {
                    actor: ctx.caller,
                    executor,
                },
            );
            Ok(())
        })
    }

    /// Configure where `execute_emergency_migration` sends custody balances
    /// of `assets`.
    pub fn set_emergency_migration(
        &mut self,
        ctx: CallContext,
        recipient: Address,
        assets: Vec<AssetId>,
    ) -> Result<(), VaultError> {
        self.transact("set_emergency_migration", &ctx, |v| {
            v.only_owner(&ctx)?;
            v.when_paused()?;
            recipient.require_non_zero()?;
            if assets.is_empty() {
                return Err(VaultError::EmptyArray);
            }
            v.emergency.recipient = Some(recipient);
            v.emergency.assets = assets.clone();
            let epoch = v.clock.epoch_at(ctx.now);
            v.log.emit(
                epoch,
                VaultEvent::EmergencyMigrationSet {
                    actor: ctx.caller,
                    recipient,
                    assets,
                },
            );
            Ok(())
        })
    }

    /// Move every configured asset's custody balance to the migration
    /// recipient. Runs once, by the emergency executor, while paused.
    pub fn execute_emergency_migration(
        &mut self,
        ctx: CallContext,
    ) -> Result<Vec<(AssetId, u128)>, VaultError> {
        self.transact("execute_emergency_migration", &ctx, |v| {
            v.when_paused()?;
            if v.emergency.executor != Some(ctx.caller) {
                return Err(VaultError::NotAuthorized);
            }
            if v.emergency.executed {
                return Err(VaultError::MigrationUnavailable(
                    "migration already executed".to_string(),
                ));
            }
            let recipient = v.emergency.recipient.ok_or_else(|| {
                VaultError::MigrationUnavailable("no migration configured".to_string())
            })?;

            let custody = v.custody.account();
            let mut transfers = Vec::with_capacity(v.emergency.assets.len());
            for asset in v.emergency.assets.clone() {
                let balance = v.host.assets().balance_of(&custody, asset);
                if balance > 0 {
                    v.host
                        .assets_mut()
                        .transfer_from(&custody, &recipient, asset, balance)?;
                }
                transfers.push((asset, balance));
            }
            v.emergency.executed = true;

            let epoch = v.clock.epoch_at(ctx.now);
            v.log.emit(
                epoch,
                VaultEvent::EmergencyMigrationExecuted {
                    actor: ctx.caller,
                    recipient,
                    transfers: transfers.clone(),
                },
            );
            Ok(transfers)
        })
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn clock(&self) -> EpochClock {
        self.clock
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// External collaborators can change between vault calls (funding an
    /// account, publishing a reward root); this is that seam.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn is_developer(&self, account: &Address) -> bool {
        self.developers.contains(account)
    }

    pub fn delegation_space(&self) -> &str {
        &self.delegation_space
    }

    pub fn vote_delegate(&self) -> Option<Address> {
        self.host
            .delegation()
            .delegate(&self.custody.account(), &self.delegation_space)
    }

    pub fn emergency_executor(&self) -> Option<Address> {
        self.emergency.executor
    }

    pub fn current_epoch(&self, now: u64) -> u64 {
        self.clock.epoch_at(now)
    }

    pub fn current_snapshot_id(&self, now: u64) -> SnapshotId {
        self.distributor.current_snapshot_id(now)
    }

    pub fn epoch(&self, epoch: u64) -> Option<&Epoch> {
        self.distributor.epochs().get(epoch)
    }

    pub fn is_snapshot_reward_redeemed(&self, account: &Address, epoch: u64, reward_index: usize) -> bool {
        self.distributor
            .epochs()
            .is_redeemed(account, epoch, reward_index)
    }

    pub fn outstanding_redemptions(&self) -> u128 {
        self.redemptions.book().total()
    }

    pub fn redemptions(&self, unlock_time: u64) -> u128 {
        self.redemptions.book().outstanding_at(unlock_time)
    }

    pub fn redemption_book(&self) -> &RedemptionBook {
        self.redemptions.book()
    }

    /// Terms a redemption against `lock_index` would get at `now`.
    pub fn quote_redemption(
        &self,
        lock_index: usize,
        assets: u128,
        now: u64,
    ) -> Result<RedemptionQuote, VaultError> {
        self.redemptions
            .quote(&self.host, &self.fees, lock_index, assets, now)
    }

    /// Primary tokens that can still be redeemed against `lock_index`.
    pub fn redemption_allowance(&self, lock_index: usize, now: u64) -> Result<u128, VaultError> {
        self.redemptions.allowance(&self.host, lock_index, now)
    }

    pub fn pending_locks(&self) -> u128 {
        self.custody.pending_locks()
    }

    /// Underlying held liquid in custody.
    pub fn custody_balance(&self) -> u128 {
        self.custody.balance(&self.host)
    }

    pub fn locked_balance(&self) -> u128 {
        self.host.positions().locked_balance()
    }

    pub fn primary_balance(&self, account: &Address) -> u128 {
        self.host.primary().balance_of(account, FUNGIBLE)
    }

    pub fn primary_supply(&self) -> u128 {
        self.host.primary().total_supply(FUNGIBLE)
    }

    pub fn receipt_balance(&self, kind: ReceiptKind, account: &Address, id: u64) -> u128 {
        self.host.receipts(kind).balance_of(account, id)
    }

    pub fn receipt_supply(&self, kind: ReceiptKind, id: u64) -> u128 {
        self.host.receipts(kind).total_supply(id)
    }

    pub fn events(&self) -> &[AuditRecord] {
        self.log.records()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }
}
