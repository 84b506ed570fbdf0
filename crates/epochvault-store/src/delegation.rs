// crates/epochvault-store/src/delegation.rs

use std::collections::BTreeMap;

use epochvault_core::error::VaultError;
use epochvault_core::traits::DelegationRegistry;
use epochvault_core::Address;

/// Delegates keyed by (delegator, space).
#[derive(Debug, Clone, Default)]
pub struct MemoryDelegation {
    delegates: BTreeMap<(Address, String), Address>,
}

impl MemoryDelegation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DelegationRegistry for MemoryDelegation {
    fn set_delegate(
        &mut self,
        delegator: &Address,
        space: &str,
        delegate: &Address,
    ) -> Result<(), VaultError> {
        let delegate = delegate.require_non_zero()?;
        self.delegates
            .insert((*delegator, space.to_string()), delegate);
        Ok(())
    }

    fn clear_delegate(&mut self, delegator: &Address, space: &str) -> Result<(), VaultError> {
        self.delegates
            .remove(&(*delegator, space.to_string()))
            .map(|_| ())
            .ok_or_else(|| VaultError::Ledger(format!("no delegate set in space {}", space)))
    }

    fn delegate(&self, delegator: &Address, space: &str) -> Option<Address> {
        self.delegates.get(&(*delegator, space.to_string())).copied()
    }
}
