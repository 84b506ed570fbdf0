// crates/epochvault-store/src/fees.rs
//
// Recording fee sink. Accumulates totals per (class, asset); splitting them
// among treasury and contributors happens outside the vault.

use std::collections::BTreeMap;

use epochvault_core::error::VaultError;
use epochvault_core::traits::{FeeClass, FeeSink};
use epochvault_core::{Address, AssetId};

#[derive(Debug, Clone)]
pub struct MemoryFeeSink {
    account: Address,
    collected: BTreeMap<(FeeClass, AssetId), u128>,
}

impl MemoryFeeSink {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            collected: BTreeMap::new(),
        }
    }

    /// Total fees of `class` received in `asset`.
    pub fn collected(&self, class: FeeClass, asset: &AssetId) -> u128 {
        self.collected.get(&(class, *asset)).copied().unwrap_or(0)
    }
}

impl FeeSink for MemoryFeeSink {
    fn account(&self) -> Address {
        self.account
    }

    fn distribute(
        &mut self,
        class: FeeClass,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(), VaultError> {
        let entry = self.collected.entry((class, *asset)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(VaultError::Overflow("fee total"))?;
        Ok(())
    }
}
