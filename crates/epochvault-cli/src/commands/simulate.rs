// crates/epochvault-cli/src/commands/simulate.rs
//
// `epochvault simulate --script <file.json>`: replay a script of vault calls
// against a fresh in-memory host and report each step and every event.
//
// A script is a JSON object with a `steps` array. Each step names the call
// time `at`, the calling `actor` (a label or 0x address), and an `action`
// with its arguments, e.g.
//
//   { "at": 0, "actor": "alice", "action": "deposit", "assets": "1.5" }
//
// Token amounts are whole-token decimals, given as strings or integers.
// Failing steps are reported and leave the vault unchanged; the replay
// continues with the next step.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use thiserror::Error;

use epochvault_core::crypto::{merkle_proof, merkle_root, reward_leaf};
use epochvault_core::error::VaultError;
use epochvault_core::traits::{BalanceLedger, Host};
use epochvault_core::{Address, AssetId, FuturesKind};
use epochvault_economics::{
    format_percent, format_units, parse_units, AuditRecord, CallContext, FeeKind, RewardClaim,
    RewardSplit, Vault, VaultConfig, UNIT,
};
use epochvault_store::{HostAccounts, MemoryHost};

use crate::output::{format_json, format_table, OutputFormat};

#[derive(Debug, Args)]
pub struct SimulateCmd {
    /// Path to the JSON script.
    #[arg(long)]
    pub script: PathBuf,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot read script {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse script {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Vault(#[from] VaultError),
}

// ---------------------------------------------------------------------------
// Script format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    /// Call time, unix seconds.
    pub at: u64,
    pub actor: String,
    #[serde(flatten)]
    pub action: Action,
}

/// A token quantity in whole tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Decimal(String),
    Whole(u64),
}

impl Amount {
    fn units(&self) -> Result<u128, VaultError> {
        match self {
            Amount::Decimal(s) => parse_units(s),
            Amount::Whole(n) => u128::from(*n)
                .checked_mul(UNIT)
                .ok_or(VaultError::Overflow("token amount")),
        }
    }
}

fn units(amounts: &[Amount]) -> Result<Vec<u128>, VaultError> {
    amounts.iter().map(Amount::units).collect()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Mint test funds on the asset ledger (underlying by default).
    Fund {
        account: Option<String>,
        asset: Option<String>,
        amount: Amount,
    },
    Deposit {
        assets: Amount,
        receiver: Option<String>,
        developer: Option<String>,
    },
    Lock,
    Snapshot,
    /// Publish a one-leaf reward root for the vault and claim it.
    ClaimReward {
        asset: String,
        index: u64,
        amount: Amount,
    },
    /// Pay reward assets in directly and split them.
    SplitRewards {
        assets: Vec<String>,
        amounts: Vec<Amount>,
    },
    RedeemSnapshotRewards {
        epoch: u64,
        indexes: Vec<usize>,
        receiver: Option<String>,
    },
    RedeemFuturesRewards {
        epoch: u64,
        receiver: Option<String>,
    },
    InitiateRedemptions {
        lock_indexes: Vec<usize>,
        kind: FuturesKind,
        assets: Vec<Amount>,
        receiver: Option<String>,
    },
    Redeem {
        unlock_times: Vec<u64>,
        assets: Vec<Amount>,
        receiver: Option<String>,
    },
    ExchangeFutures {
        epoch: u64,
        amount: Amount,
        from: FuturesKind,
        receiver: Option<String>,
    },
    Stake {
        rounds: u8,
        kind: FuturesKind,
        assets: Amount,
        receiver: Option<String>,
    },
    Unstake {
        expiry: u64,
        assets: Amount,
        receiver: Option<String>,
    },
    SetFee {
        fee: FeeKind,
        value: u32,
    },
    SetDeveloper {
        developer: String,
        allowed: bool,
    },
    SetPause {
        paused: bool,
    },
    SetDelegationSpace {
        space: String,
    },
    SetVoteDelegate {
        delegate: String,
    },
    ClearVoteDelegate,
    SetEmergencyExecutor {
        executor: String,
    },
    SetEmergencyMigration {
        recipient: String,
        assets: Vec<String>,
    },
    ExecuteEmergencyMigration,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Fund { .. } => "fund",
            Action::Deposit { .. } => "deposit",
            Action::Lock => "lock",
            Action::Snapshot => "snapshot",
            Action::ClaimReward { .. } => "claim_reward",
            Action::SplitRewards { .. } => "split_rewards",
            Action::RedeemSnapshotRewards { .. } => "redeem_snapshot_rewards",
            Action::RedeemFuturesRewards { .. } => "redeem_futures_rewards",
            Action::InitiateRedemptions { .. } => "initiate_redemptions",
            Action::Redeem { .. } => "redeem",
            Action::ExchangeFutures { .. } => "exchange_futures",
            Action::Stake { .. } => "stake",
            Action::Unstake { .. } => "unstake",
            Action::SetFee { .. } => "set_fee",
            Action::SetDeveloper { .. } => "set_developer",
            Action::SetPause { .. } => "set_pause",
            Action::SetDelegationSpace { .. } => "set_delegation_space",
            Action::SetVoteDelegate { .. } => "set_vote_delegate",
            Action::ClearVoteDelegate => "clear_vote_delegate",
            Action::SetEmergencyExecutor { .. } => "set_emergency_executor",
            Action::SetEmergencyMigration { .. } => "set_emergency_migration",
            Action::ExecuteEmergencyMigration => "execute_emergency_migration",
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled)]
pub struct StepRow {
    #[tabled(rename = "#")]
    pub step: usize,
    #[tabled(rename = "At")]
    pub at: u64,
    #[tabled(rename = "Epoch")]
    pub epoch: u64,
    #[tabled(rename = "Actor")]
    pub actor: String,
    #[tabled(rename = "Action")]
    pub action: String,
    #[tabled(rename = "Outcome")]
    pub outcome: String,
    #[tabled(rename = "Detail")]
    pub detail: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct EventRow {
    #[tabled(rename = "Seq")]
    pub seq: u64,
    #[tabled(rename = "At")]
    pub at: u64,
    #[tabled(rename = "Event")]
    pub event: String,
    #[tabled(rename = "Actor")]
    pub actor: String,
    #[tabled(rename = "Fields")]
    pub fields: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct AccountRow {
    #[tabled(rename = "Account")]
    pub account: String,
    #[tabled(rename = "Primary")]
    pub primary: String,
    #[tabled(rename = "Underlying")]
    pub underlying: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct SummaryRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<StepRow>,
    pub accounts: Vec<AccountRow>,
    pub summary: Vec<SummaryRow>,
    pub events: Vec<AuditRecord>,
}

impl SimulationReport {
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome != "ok").count()
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

pub struct Simulator {
    vault: Vault<MemoryHost>,
    labels: BTreeMap<Address, String>,
}

impl Simulator {
    pub fn new(config: VaultConfig) -> Result<Self, VaultError> {
        let accounts = HostAccounts::default();
        let mut labels = BTreeMap::new();
        labels.insert(config.owner, "owner".to_string());
        labels.insert(config.custody, "vault".to_string());
        labels.insert(config.underlying_asset, "underlying".to_string());
        labels.insert(config.primary_asset, "primary".to_string());
        labels.insert(accounts.locker, "locker".to_string());
        labels.insert(accounts.fee_sink, "fee-sink".to_string());

        let host = MemoryHost::with_accounts(config.epoch_duration, config.lock_duration, accounts);
        let vault = Vault::new(config, host)?;
        Ok(Self { vault, labels })
    }

    pub fn vault(&self) -> &Vault<MemoryHost> {
        &self.vault
    }

    /// Resolve a label or 0x address, remembering labels for display.
    fn resolve(&mut self, name: &str) -> Result<Address, VaultError> {
        let address: Address = name.parse()?;
        if !name.starts_with("0x") {
            self.labels.entry(address).or_insert_with(|| name.to_string());
        }
        Ok(address)
    }

    fn receiver(&mut self, receiver: &Option<String>, actor: Address) -> Result<Address, VaultError> {
        match receiver {
            Some(name) => self.resolve(name),
            None => Ok(actor),
        }
    }

    fn label(&self, address: &Address) -> String {
        self.labels
            .get(address)
            .cloned()
            .unwrap_or_else(|| address.to_string())
    }

    fn describe_splits(&self, splits: &[RewardSplit]) -> String {
        splits
            .iter()
            .map(|s| {
                format!(
                    "{}: fee {}, snapshot {}, futures {}",
                    self.label(&s.asset),
                    format_units(s.fee),
                    format_units(s.snapshot_portion),
                    format_units(s.futures_portion)
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Apply one step, returning a short description of the result.
    pub fn apply(&mut self, step: &Step) -> Result<String, VaultError> {
        let actor = self.resolve(&step.actor)?;
        let ctx = CallContext::new(actor, step.at);

        match &step.action {
            Action::Fund {
                account,
                asset,
                amount,
            } => {
                let account = self.receiver(account, actor)?;
                let asset = match asset {
                    Some(name) => self.resolve(name)?,
                    None => self.vault.config().underlying_asset,
                };
                let amount = amount.units()?;
                self.vault
                    .host_mut()
                    .assets_mut()
                    .mint(&account, asset, amount)?;
                Ok(format!(
                    "{} {} to {}",
                    format_units(amount),
                    self.label(&asset),
                    self.label(&account)
                ))
            }
            Action::Deposit {
                assets,
                receiver,
                developer,
            } => {
                let receiver = self.receiver(receiver, actor)?;
                let developer = match developer {
                    Some(name) => Some(self.resolve(name)?),
                    None => None,
                };
                let minted = self
                    .vault
                    .deposit(ctx, assets.units()?, receiver, developer)?;
                Ok(format!("minted {}", format_units(minted)))
            }
            Action::Lock => {
                let locked = self.vault.lock(ctx)?;
                Ok(format!("locked {}", format_units(locked)))
            }
            Action::Snapshot => {
                let id = self.vault.take_epoch_snapshot(ctx)?;
                Ok(format!("snapshot {}", id))
            }
            Action::ClaimReward {
                asset,
                index,
                amount,
            } => {
                let asset = self.resolve(asset)?;
                let amount = amount.units()?;
                let custody = self.vault.config().custody;
                let leaves = vec![reward_leaf(*index, &custody, amount)];
                let proof = merkle_proof(&leaves, 0).unwrap_or_default();
                self.vault
                    .host_mut()
                    .reward_source()
                    .publish_root(asset, merkle_root(&leaves));
                let claim = RewardClaim {
                    asset,
                    index: *index,
                    amount,
                    proof,
                };
                let splits = self.vault.claim_rewards(ctx, &[claim])?;
                Ok(self.describe_splits(&splits))
            }
            Action::SplitRewards { assets, amounts } => {
                let assets = assets
                    .iter()
                    .map(|name| self.resolve(name))
                    .collect::<Result<Vec<AssetId>, _>>()?;
                let splits = self.vault.claim_and_split(ctx, &assets, &units(amounts)?)?;
                Ok(self.describe_splits(&splits))
            }
            Action::RedeemSnapshotRewards {
                epoch,
                indexes,
                receiver,
            } => {
                let receiver = self.receiver(receiver, actor)?;
                let paid = self
                    .vault
                    .redeem_snapshot_rewards(ctx, *epoch, indexes, receiver)?;
                let paid: Vec<String> = paid.into_iter().map(format_units).collect();
                Ok(format!("paid [{}]", paid.join(", ")))
            }
            Action::RedeemFuturesRewards { epoch, receiver } => {
                let receiver = self.receiver(receiver, actor)?;
                let paid = self.vault.redeem_futures_rewards(ctx, *epoch, receiver)?;
                let paid: Vec<String> = paid
                    .iter()
                    .map(|(asset, amount)| format!("{} {}", format_units(*amount), self.label(asset)))
                    .collect();
                Ok(format!("paid [{}]", paid.join(", ")))
            }
            Action::InitiateRedemptions {
                lock_indexes,
                kind,
                assets,
                receiver,
            } => {
                let receiver = self.receiver(receiver, actor)?;
                let quotes =
                    self.vault
                        .initiate_redemptions(ctx, lock_indexes, *kind, &units(assets)?, receiver)?;
                Ok(quotes
                    .iter()
                    .map(|q| {
                        format!(
                            "unlock {}: fee {}, claim {}, {} {} rounds",
                            q.unlock_time,
                            format_percent(q.fee_percent),
                            format_units(q.post_fee),
                            q.rounds,
                            kind
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("; "))
            }
            Action::Redeem {
                unlock_times,
                assets,
                receiver,
            } => {
                let receiver = self.receiver(receiver, actor)?;
                let paid = self
                    .vault
                    .redeem(ctx, unlock_times, &units(assets)?, receiver)?;
                Ok(format!("paid {}", format_units(paid)))
            }
            Action::ExchangeFutures {
                epoch,
                amount,
                from,
                receiver,
            } => {
                let receiver = self.receiver(receiver, actor)?;
                let amount = amount.units()?;
                self.vault
                    .exchange_futures(ctx, *epoch, amount, receiver, *from)?;
                Ok(format!("{} {} -> {}", format_units(amount), from, from.other()))
            }
            Action::Stake {
                rounds,
                kind,
                assets,
                receiver,
            } => {
                let receiver = self.receiver(receiver, actor)?;
                let expiry = self
                    .vault
                    .stake(ctx, *rounds, *kind, assets.units()?, receiver)?;
                Ok(format!("expiry {}", expiry))
            }
            Action::Unstake {
                expiry,
                assets,
                receiver,
            } => {
                let receiver = self.receiver(receiver, actor)?;
                let assets = assets.units()?;
                self.vault.unstake(ctx, *expiry, assets, receiver)?;
                Ok(format!("returned {}", format_units(assets)))
            }
            Action::SetFee { fee, value } => {
                self.vault.set_fee(ctx, *fee, *value)?;
                Ok(format!("{:?} = {}", fee, format_percent(*value)))
            }
            Action::SetDeveloper { developer, allowed } => {
                let developer = self.resolve(developer)?;
                self.vault.set_developer(ctx, developer, *allowed)?;
                Ok(format!("{} allowed = {}", self.label(&developer), allowed))
            }
            Action::SetPause { paused } => {
                self.vault.set_pause_state(ctx, *paused)?;
                Ok(format!("paused = {}", paused))
            }
            Action::SetDelegationSpace { space } => {
                self.vault.set_delegation_space(ctx, space)?;
                Ok(format!("space = {}", space))
            }
            Action::SetVoteDelegate { delegate } => {
                let delegate = self.resolve(delegate)?;
                self.vault.set_vote_delegate(ctx, delegate)?;
                Ok(format!("delegate = {}", self.label(&delegate)))
            }
            Action::ClearVoteDelegate => {
                self.vault.clear_vote_delegate(ctx)?;
                Ok("delegate cleared".to_string())
            }
            Action::SetEmergencyExecutor { executor } => {
                let executor = self.resolve(executor)?;
                self.vault.set_emergency_executor(ctx, executor)?;
                Ok(format!("executor = {}", self.label(&executor)))
            }
            Action::SetEmergencyMigration { recipient, assets } => {
                let recipient = self.resolve(recipient)?;
                let assets = assets
                    .iter()
                    .map(|name| self.resolve(name))
                    .collect::<Result<Vec<AssetId>, _>>()?;
                let count = assets.len();
                self.vault.set_emergency_migration(ctx, recipient, assets)?;
                Ok(format!("{} assets to {}", count, self.label(&recipient)))
            }
            Action::ExecuteEmergencyMigration => {
                let moved = self.vault.execute_emergency_migration(ctx)?;
                let moved: Vec<String> = moved
                    .iter()
                    .map(|(asset, amount)| format!("{} {}", format_units(*amount), self.label(asset)))
                    .collect();
                Ok(format!("moved [{}]", moved.join(", ")))
            }
        }
    }

    /// Replay every step and build the report.
    pub fn run(&mut self, script: &Script) -> SimulationReport {
        let mut steps = Vec::with_capacity(script.steps.len());
        for (i, step) in script.steps.iter().enumerate() {
            let (outcome, detail) = match self.apply(step) {
                Ok(detail) => ("ok".to_string(), detail),
                Err(e) => {
                    tracing::debug!(step = i, action = step.action.name(), error = %e, "Step failed");
                    ("error".to_string(), e.to_string())
                }
            };
            steps.push(StepRow {
                step: i,
                at: step.at,
                epoch: self.vault.current_epoch(step.at),
                actor: step.actor.clone(),
                action: step.action.name().to_string(),
                outcome,
                detail,
            });
        }

        SimulationReport {
            steps,
            accounts: self.account_rows(),
            summary: self.summary_rows(),
            events: self.vault.events().to_vec(),
        }
    }

    fn account_rows(&self) -> Vec<AccountRow> {
        let underlying = self.vault.config().underlying_asset;
        let mut rows: Vec<AccountRow> = self
            .labels
            .iter()
            .map(|(address, label)| {
                let primary = self.vault.primary_balance(address);
                let held = self.vault.host().assets().balance_of(address, underlying);
                (label, primary, held)
            })
            .filter(|(_, primary, held)| *primary > 0 || *held > 0)
            .map(|(label, primary, held)| AccountRow {
                account: label.clone(),
                primary: format_units(primary),
                underlying: format_units(held),
            })
            .collect();
        rows.sort_by(|a, b| a.account.cmp(&b.account));
        rows
    }

    fn summary_rows(&self) -> Vec<SummaryRow> {
        let v = &self.vault;
        let metric = |name: &str, value: String| SummaryRow {
            metric: name.to_string(),
            value,
        };
        vec![
            metric("primary supply", format_units(v.primary_supply())),
            metric("locked", format_units(v.locked_balance())),
            metric("custody", format_units(v.custody_balance())),
            metric("pending locks", format_units(v.pending_locks())),
            metric("outstanding redemptions", format_units(v.outstanding_redemptions())),
            metric("paused", v.is_paused().to_string()),
            metric("events", v.events().len().to_string()),
        ]
    }

    fn event_rows(&self) -> Vec<EventRow> {
        self.vault
            .events()
            .iter()
            .map(|record| EventRow {
                seq: record.seq,
                at: record.at,
                event: record.event.name().to_string(),
                actor: self.label(&record.event.actor()),
                fields: self.event_fields(record),
            })
            .collect()
    }

    /// Event fields other than the kind and actor, with known addresses
    /// shown by label.
    fn event_fields(&self, record: &AuditRecord) -> String {
        let value = match serde_json::to_value(&record.event) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return format!("{:?}", record.event),
        };
        value
            .into_iter()
            .filter(|(key, _)| key != "kind" && key != "actor")
            .map(|(key, field)| format!("{}={}", key, self.render_field(&field)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render_field(&self, field: &serde_json::Value) -> String {
        match field {
            serde_json::Value::String(s) => match s.parse::<Address>() {
                Ok(address) if s.starts_with("0x") => self.label(&address),
                _ => s.clone(),
            },
            serde_json::Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|i| self.render_field(i)).collect();
                format!("[{}]", items.join(","))
            }
            other => other.to_string(),
        }
    }
}

pub fn load_script(path: &PathBuf) -> Result<Script, ScriptError> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ScriptError::Parse {
        path: display,
        source,
    })
}

pub fn run(
    cmd: &SimulateCmd,
    config: &VaultConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = load_script(&cmd.script)?;
    tracing::info!(
        script = %cmd.script.display(),
        steps = script.steps.len(),
        "Replaying script"
    );

    let mut simulator = Simulator::new(config.clone()).map_err(ScriptError::from)?;
    let report = simulator.run(&script);
    if report.failed_steps() > 0 {
        tracing::warn!("{} of {} steps failed", report.failed_steps(), report.steps.len());
    }

    match format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            println!("Steps");
            println!("{}", format_table(&report.steps));
            println!();
            println!("Events");
            println!("{}", format_table(&simulator.event_rows()));
            println!();
            println!("Accounts");
            println!("{}", format_table(&report.accounts));
            println!();
            println!("Summary");
            println!("{}", format_table(&report.summary));
        }
    }
    Ok(())
}
