// crates/epochvault-core/src/traits.rs
//
// Capability traits for the vault's external collaborators.
//
// The engine never depends on a concrete ledger. Fungible and id-keyed
// balance ledgers share one interface (`BalanceLedger`), the primary ledger
// adds point-in-time snapshots (`SnapshotLedger`), and the remaining services
// are reached through narrow traits. `Host` bundles one implementation of
// each so the engine can be generic over a single type parameter.

use serde::{Deserialize, Serialize};

use crate::address::{Address, AssetId};
use crate::error::VaultError;
use crate::receipt::ReceiptKind;

/// Token id within an id-keyed ledger (epoch, unlock time, or expiry).
pub type TokenId = u64;

/// Id used by fungible ledgers, which carry a single token.
pub const FUNGIBLE: TokenId = 0;

/// Identifier of a point-in-time snapshot. Ids start at 1; 0 means "none".
pub type SnapshotId = u64;

/// Mint/burn/transfer/balance capability shared by every balance ledger.
///
/// `Id` selects the token inside the ledger: a [`TokenId`] for receipt
/// ledgers (use [`FUNGIBLE`] for single-token ledgers) or an [`AssetId`] for
/// the multi-asset custody bank.
pub trait BalanceLedger<Id: Copy + Ord = TokenId> {
    /// Create `amount` of `id` in `to`'s balance.
    fn mint(&mut self, to: &Address, id: Id, amount: u128) -> Result<(), VaultError>;

    /// Destroy `amount` of `id` from `from`'s balance.
    fn burn(&mut self, from: &Address, id: Id, amount: u128) -> Result<(), VaultError>;

    /// Move `amount` of `id` between two accounts. The vault acts as an
    /// approved operator for every account it moves funds for.
    fn transfer_from(
        &mut self,
        from: &Address,
        to: &Address,
        id: Id,
        amount: u128,
    ) -> Result<(), VaultError>;

    fn balance_of(&self, account: &Address, id: Id) -> u128;

    fn total_supply(&self, id: Id) -> u128;
}

/// A fungible ledger that can freeze balances and supply at a point in time.
pub trait SnapshotLedger: BalanceLedger {
    /// Record the current balances and return the new snapshot id.
    fn snapshot(&mut self) -> SnapshotId;

    /// Id of the most recent snapshot, or 0 if none has been taken.
    fn current_snapshot_id(&self) -> SnapshotId;

    /// Balance of `account` as of `snapshot`.
    fn balance_of_at(&self, account: &Address, snapshot: SnapshotId) -> Result<u128, VaultError>;

    /// Total supply as of `snapshot`.
    fn total_supply_at(&self, snapshot: SnapshotId) -> Result<u128, VaultError>;
}

/// One locked position held by the external locking adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPosition {
    pub amount: u128,
    pub unlock_time: u64,
}

/// Adapter to the external locking position.
pub trait PositionProvider {
    /// The unexpired lock at `index`, in unlock-time order.
    fn lock_at(&self, index: usize) -> Option<LockedPosition>;

    fn lock_count(&self) -> usize;

    /// Lock `amount` of underlying at `now`. The caller has already moved the
    /// underlying to [`PositionProvider::custody_account`].
    fn lock(&mut self, amount: u128, now: u64) -> Result<(), VaultError>;

    /// Release every lock whose unlock time is `<= now`, returning the total
    /// amount released. The caller moves that amount back out of custody.
    fn process_expired_locks(&mut self, now: u64) -> Result<u128, VaultError>;

    /// Total amount currently locked.
    fn locked_balance(&self) -> u128;

    /// Account holding locked underlying in the asset ledger.
    fn custody_account(&self) -> Address;
}

/// External reward distributor publishing one Merkle root per asset.
pub trait MerkleRewardSource {
    /// Claim leaf `index` paying `amount` of `asset` to `account`.
    ///
    /// Returns the amount released. Fails with `InvalidProof` when the proof
    /// does not reach the published root and `AlreadyClaimed` on replay.
    fn claim(
        &mut self,
        asset: &AssetId,
        index: u64,
        account: &Address,
        amount: u128,
        proof: &[[u8; 32]],
    ) -> Result<u128, VaultError>;
}

/// Namespaced vote-delegation registry.
pub trait DelegationRegistry {
    fn set_delegate(
        &mut self,
        delegator: &Address,
        space: &str,
        delegate: &Address,
    ) -> Result<(), VaultError>;

    fn clear_delegate(&mut self, delegator: &Address, space: &str) -> Result<(), VaultError>;

    fn delegate(&self, delegator: &Address, space: &str) -> Option<Address>;
}

/// Recipient class a fee transfer is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeeClass {
    /// Fee skimmed off claimed reward batches.
    Reward,
    /// Exit fee charged when initiating a redemption.
    Redemption,
}

/// Receiver of protocol fees. How the sink splits them is its own business.
pub trait FeeSink {
    /// Account fee amounts are moved to before `distribute` is called.
    fn account(&self) -> Address;

    fn distribute(&mut self, class: FeeClass, asset: &AssetId, amount: u128)
        -> Result<(), VaultError>;
}

/// Bundle of every collaborator the vault talks to.
///
/// `Clone` is required so the vault can run each operation against a draft
/// copy and commit it only on success.
pub trait Host: Clone {
    type Primary: SnapshotLedger + Clone;
    type Receipts: BalanceLedger + Clone;
    type Assets: BalanceLedger<AssetId> + Clone;
    type Positions: PositionProvider + Clone;
    type Rewards: MerkleRewardSource + Clone;
    type Delegation: DelegationRegistry + Clone;
    type Fees: FeeSink + Clone;

    fn primary(&self) -> &Self::Primary;
    fn primary_mut(&mut self) -> &mut Self::Primary;

    fn receipts(&self, kind: ReceiptKind) -> &Self::Receipts;
    fn receipts_mut(&mut self, kind: ReceiptKind) -> &mut Self::Receipts;

    fn assets(&self) -> &Self::Assets;
    fn assets_mut(&mut self) -> &mut Self::Assets;

    fn positions(&self) -> &Self::Positions;
    fn positions_mut(&mut self) -> &mut Self::Positions;

    fn reward_source_mut(&mut self) -> &mut Self::Rewards;

    fn delegation(&self) -> &Self::Delegation;
    fn delegation_mut(&mut self) -> &mut Self::Delegation;

    fn fee_sink(&self) -> &Self::Fees;
    fn fee_sink_mut(&mut self) -> &mut Self::Fees;
}
