// crates/epochvault-economics/src/custody.rs
//
// Underlying-asset custody and relocking.
//
// Deposited underlying lands in the vault's custody account and is counted
// as pending until the next relock. Relocking moves
// max(balance - outstanding_redemptions, pending) into the locking adapter,
// so underlying reserved for initiated redemptions stays liquid once its
// lock matures.

use epochvault_core::error::VaultError;
use epochvault_core::traits::{BalanceLedger, Host, PositionProvider};
use epochvault_core::{Address, AssetId};

use crate::events::{EventLog, VaultEvent};

#[derive(Debug, Clone)]
pub struct Custody {
    account: Address,
    underlying: AssetId,
    pending_locks: u128,
}

impl Custody {
    pub fn new(account: Address, underlying: AssetId) -> Self {
        Self {
            account,
            underlying,
            pending_locks: 0,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn underlying(&self) -> AssetId {
        self.underlying
    }

    /// Deposited underlying not yet locked.
    pub fn pending_locks(&self) -> u128 {
        self.pending_locks
    }

    /// Underlying held in custody (not locked).
    pub fn balance<H: Host>(&self, host: &H) -> u128 {
        host.assets().balance_of(&self.account, self.underlying)
    }

    /// Pull `amount` of underlying from `from` into custody.
    pub fn receive<H: Host>(&mut self, host: &mut H, from: &Address, amount: u128) -> Result<(), VaultError> {
        host.assets_mut()
            .transfer_from(from, &self.account, self.underlying, amount)?;
        self.pending_locks = self
            .pending_locks
            .checked_add(amount)
            .ok_or(VaultError::Overflow("pending locks"))?;
        Ok(())
    }

    /// Pay `amount` of underlying out of custody.
    pub fn pay<H: Host>(&self, host: &mut H, to: &Address, amount: u128) -> Result<(), VaultError> {
        if amount == 0 {
            return Ok(());
        }
        host.assets_mut()
            .transfer_from(&self.account, to, self.underlying, amount)
    }

    /// Release every matured lock back into custody. Returns the amount.
    pub fn release_expired<H: Host>(&self, host: &mut H, now: u64) -> Result<u128, VaultError> {
        let released = host.positions_mut().process_expired_locks(now)?;
        if released > 0 {
            let locker = host.positions().custody_account();
            host.assets_mut()
                .transfer_from(&locker, &self.account, self.underlying, released)?;
            tracing::debug!(released, "matured locks released to custody");
        }
        Ok(released)
    }

    /// Lock whatever custody holds beyond `outstanding`, or at least the
    /// pending deposits. Returns the amount locked.
    pub fn relock<H: Host>(
        &mut self,
        host: &mut H,
        log: &mut EventLog,
        outstanding: u128,
        actor: &Address,
        epoch: u64,
        now: u64,
    ) -> Result<u128, VaultError> {
        let balance = self.balance(host);
        if balance <= outstanding && self.pending_locks == 0 {
            return Ok(0);
        }

        let amount = balance
            .saturating_sub(outstanding)
            .max(self.pending_locks)
            .min(balance);
        self.pending_locks = 0;
        if amount == 0 {
            return Ok(0);
        }

        let locker = host.positions().custody_account();
        host.assets_mut()
            .transfer_from(&self.account, &locker, self.underlying, amount)?;
        host.positions_mut().lock(amount, now)?;

        log.emit(
            epoch,
            VaultEvent::Locked {
                actor: *actor,
                amount,
            },
        );
        Ok(amount)
    }
}
