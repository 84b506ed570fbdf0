// crates/epochvault-economics/src/staking.rs
//
// Term staking: primary tokens are burned for a fixed number of epochs in
// exchange for stake receipts plus futures covering the whole term.
//
// Staking `assets` for `rounds` epochs at time t:
//   expiry = epoch(t) + rounds * D
//   burns `assets` of primary from the caller
//   mints `assets` stake receipts of id `expiry`
//   mints `assets` futures of the chosen kind for each of the `rounds` epochs
// Unstaking at or after `expiry` burns the stake receipts and mints the same
// amount of primary back.

use epochvault_core::error::VaultError;
use epochvault_core::receipt::{FuturesKind, ReceiptKind};
use epochvault_core::traits::{BalanceLedger, Host, FUNGIBLE};
use epochvault_core::Address;

use crate::clock::EpochClock;
use crate::events::{EventLog, VaultEvent};
use crate::futures::FuturesMinter;

#[derive(Debug, Clone, Copy)]
pub struct StakeManager {
    clock: EpochClock,
    minter: FuturesMinter,
}

impl StakeManager {
    pub fn new(clock: EpochClock) -> Self {
        Self {
            clock,
            minter: FuturesMinter::new(clock),
        }
    }

    /// Stake `assets` of `caller`'s primary tokens for `rounds` epochs.
    /// Returns the stake expiry.
    ///
    /// # Errors
    /// `ZeroAmount` for zero rounds or assets, `ZeroAddress` for a zero
    /// receiver, and `InsufficientBalance` if the caller holds too little.
    #[allow(clippy::too_many_arguments)]
    pub fn stake<H: Host>(
        &self,
        host: &mut H,
        log: &mut EventLog,
        rounds: u8,
        kind: FuturesKind,
        assets: u128,
        receiver: &Address,
        caller: &Address,
        now: u64,
    ) -> Result<u64, VaultError> {
        if rounds == 0 || assets == 0 {
            return Err(VaultError::ZeroAmount);
        }
        receiver.require_non_zero()?;

        let expiry = self.clock.epochs_ahead(now, u64::from(rounds))?;

        host.primary_mut().burn(caller, FUNGIBLE, assets)?;
        host.receipts_mut(ReceiptKind::Stake)
            .mint(receiver, expiry, assets)?;
        self.minter
            .mint(host, log, u64::from(rounds), kind, assets, receiver, caller, now)?;

        log.emit(
            expiry,
            VaultEvent::Staked {
                actor: *caller,
                receiver: *receiver,
                rounds,
                assets,
            },
        );
        Ok(expiry)
    }

    /// Return `assets` of expired stake at `expiry` to `receiver` as primary
    /// tokens.
    #[allow(clippy::too_many_arguments)]
    pub fn unstake<H: Host>(
        &self,
        host: &mut H,
        log: &mut EventLog,
        expiry: u64,
        assets: u128,
        receiver: &Address,
        caller: &Address,
        now: u64,
    ) -> Result<(), VaultError> {
        if assets == 0 {
            return Err(VaultError::ZeroAmount);
        }
        receiver.require_non_zero()?;
        if now < expiry {
            return Err(VaultError::BeforeStakingExpiry { expiry, now });
        }

        host.receipts_mut(ReceiptKind::Stake)
            .burn(caller, expiry, assets)?;
        host.primary_mut().mint(receiver, FUNGIBLE, assets)?;

        log.emit(
            expiry,
            VaultEvent::Unstaked {
                actor: *caller,
                receiver: *receiver,
                assets,
            },
        );
        Ok(())
    }
}
