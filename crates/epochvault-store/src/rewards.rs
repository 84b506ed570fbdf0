// crates/epochvault-store/src/rewards.rs
//
// In-memory Merkle reward source.
//
// One root per asset. Publishing a new root for an asset starts a new round
// and forgets which leaves of the previous round were claimed.

use std::collections::{BTreeMap, BTreeSet};

use epochvault_core::crypto::{reward_leaf, verify_proof};
use epochvault_core::error::VaultError;
use epochvault_core::traits::MerkleRewardSource;
use epochvault_core::{Address, AssetId};

#[derive(Debug, Clone, Default)]
pub struct MemoryRewardSource {
    roots: BTreeMap<AssetId, [u8; 32]>,
    claimed: BTreeSet<(AssetId, u64)>,
}

impl MemoryRewardSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the root for `asset`'s current round.
    pub fn publish_root(&mut self, asset: AssetId, root: [u8; 32]) {
        self.roots.insert(asset, root);
        self.claimed.retain(|(a, _)| *a != asset);
        tracing::debug!("Published reward root for asset {}", asset);
    }

    pub fn is_claimed(&self, asset: &AssetId, index: u64) -> bool {
        self.claimed.contains(&(*asset, index))
    }
}

impl MerkleRewardSource for MemoryRewardSource {
    fn claim(
        &mut self,
        asset: &AssetId,
        index: u64,
        account: &Address,
        amount: u128,
        proof: &[[u8; 32]],
    ) -> Result<u128, VaultError> {
        let root = self.roots.get(asset).ok_or(VaultError::InvalidProof)?;
        if self.claimed.contains(&(*asset, index)) {
            return Err(VaultError::AlreadyClaimed { index });
        }
        let leaf = reward_leaf(index, account, amount);
        if !verify_proof(root, &leaf, proof) {
            return Err(VaultError::InvalidProof);
        }
        self.claimed.insert((*asset, index));
        Ok(amount)
    }
}
