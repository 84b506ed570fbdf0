// crates/epochvault-store/src/ledger.rs
//
// In-memory id-keyed balance ledger.
//
// Backs the receipt ledgers (id = epoch / unlock time / expiry) and the
// multi-asset custody bank (id = asset address).

use std::collections::BTreeMap;

use epochvault_core::error::VaultError;
use epochvault_core::traits::{BalanceLedger, TokenId};
use epochvault_core::Address;

/// Balances and supply per token id.
#[derive(Debug, Clone)]
pub struct MemoryLedger<Id = TokenId> {
    name: String,
    balances: BTreeMap<(Id, Address), u128>,
    supply: BTreeMap<Id, u128>,
}

impl<Id: Copy + Ord> MemoryLedger<Id> {
    /// Create an empty ledger. `name` appears in error messages.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            balances: BTreeMap::new(),
            supply: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token ids with non-zero supply, ascending.
    pub fn ids(&self) -> Vec<Id> {
        self.supply
            .iter()
            .filter(|(_, supply)| **supply > 0)
            .map(|(id, _)| *id)
            .collect()
    }

    fn debit(&mut self, from: &Address, id: Id, amount: u128) -> Result<(), VaultError> {
        let balance = self.balances.get(&(id, *from)).copied().unwrap_or(0);
        if balance < amount {
            return Err(VaultError::InsufficientBalance(format!(
                "{}: account {} holds {} but {} is required",
                self.name, from, balance, amount
            )));
        }
        let remaining = balance - amount;
        if remaining == 0 {
            self.balances.remove(&(id, *from));
        } else {
            self.balances.insert((id, *from), remaining);
        }
        Ok(())
    }

    fn credit(&mut self, to: &Address, id: Id, amount: u128) -> Result<(), VaultError> {
        let entry = self.balances.entry((id, *to)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(VaultError::Overflow("ledger balance"))?;
        Ok(())
    }
}

impl<Id: Copy + Ord> BalanceLedger<Id> for MemoryLedger<Id> {
    fn mint(&mut self, to: &Address, id: Id, amount: u128) -> Result<(), VaultError> {
        let to = to.require_non_zero()?;
        let supply = self.supply.get(&id).copied().unwrap_or(0);
        let new_supply = supply
            .checked_add(amount)
            .ok_or(VaultError::Overflow("ledger supply"))?;
        self.credit(&to, id, amount)?;
        self.supply.insert(id, new_supply);
        Ok(())
    }

    fn burn(&mut self, from: &Address, id: Id, amount: u128) -> Result<(), VaultError> {
        self.debit(from, id, amount)?;
        let supply = self.supply.get(&id).copied().unwrap_or(0);
        let new_supply = supply
            .checked_sub(amount)
            .ok_or(VaultError::Underflow("ledger supply"))?;
        self.supply.insert(id, new_supply);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        from: &Address,
        to: &Address,
        id: Id,
        amount: u128,
    ) -> Result<(), VaultError> {
        let to = to.require_non_zero()?;
        self.debit(from, id, amount)?;
        self.credit(&to, id, amount)
    }

    fn balance_of(&self, account: &Address, id: Id) -> u128 {
        self.balances.get(&(id, *account)).copied().unwrap_or(0)
    }

    fn total_supply(&self, id: Id) -> u128 {
        self.supply.get(&id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    #[test]
    fn test_mint_and_burn_track_supply_per_id() {
        let mut ledger: MemoryLedger = MemoryLedger::new("receipts");
        ledger.mint(&alice(), 100, 500).unwrap();
        ledger.mint(&bob(), 100, 300).unwrap();
        ledger.mint(&alice(), 200, 50).unwrap();

        assert_eq!(ledger.total_supply(100), 800);
        assert_eq!(ledger.total_supply(200), 50);

        ledger.burn(&alice(), 100, 200).unwrap();
        assert_eq!(ledger.balance_of(&alice(), 100), 300);
        assert_eq!(ledger.total_supply(100), 600);
        assert_eq!(ledger.ids(), vec![100, 200]);
    }

    #[test]
    fn test_burn_more_than_balance_fails_without_change() {
        let mut ledger: MemoryLedger = MemoryLedger::new("receipts");
        ledger.mint(&alice(), 1, 10).unwrap();
        let err = ledger.burn(&alice(), 1, 11).unwrap_err();
        assert!(matches!(err, VaultError::InsufficientBalance(_)));
        assert_eq!(ledger.balance_of(&alice(), 1), 10);
        assert_eq!(ledger.total_supply(1), 10);
    }

    #[test]
    fn test_transfer_is_supply_neutral() {
        let mut ledger: MemoryLedger = MemoryLedger::new("receipts");
        ledger.mint(&alice(), 7, 100).unwrap();
        ledger.transfer_from(&alice(), &bob(), 7, 40).unwrap();
        assert_eq!(ledger.balance_of(&alice(), 7), 60);
        assert_eq!(ledger.balance_of(&bob(), 7), 40);
        assert_eq!(ledger.total_supply(7), 100);
    }

    #[test]
    fn test_zero_receiver_rejected() {
        let mut ledger: MemoryLedger = MemoryLedger::new("receipts");
        assert_eq!(ledger.mint(&Address::ZERO, 1, 1), Err(VaultError::ZeroAddress));
    }

    #[test]
    fn test_asset_keyed_ledger() {
        let mut bank: MemoryLedger<Address> = MemoryLedger::new("assets");
        let token = Address::from_label("reward-token");
        bank.mint(&alice(), token, 42).unwrap();
        assert_eq!(bank.balance_of(&alice(), token), 42);
        assert_eq!(bank.total_supply(token), 42);
    }
}
