// crates/epochvault-economics/src/redemption.rs
//
// Redemption engine: converting primary tokens into deferred claims on
// specific locked positions, settling them at unlock, and exchanging
// futures between kinds.
//
// Initiating a redemption of `assets` against a lock with unlock time U at
// time t (t < U):
//   remaining = U - t
//   fee%      = exit fee for `remaining` (see fees.rs)
//   fee       = assets * fee% / FEE_DENOMINATOR, moved to the fee sink
//   post_fee  = assets - fee, burned from the caller
//   deferred claims of id U are minted for post_fee, and post_fee futures
//   for each of floor(remaining / D) upcoming epochs.
// The sum of post_fee amounts initiated against U never exceeds the lock's
// amount at the time of each request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use epochvault_core::error::VaultError;
use epochvault_core::receipt::{FuturesKind, ReceiptKind};
use epochvault_core::traits::{
    BalanceLedger, FeeClass, FeeSink, Host, LockedPosition, PositionProvider, FUNGIBLE,
};
use epochvault_core::{Address, AssetId};

use crate::clock::EpochClock;
use crate::custody::Custody;
use crate::events::{EventLog, VaultEvent};
use crate::fees::FeeSchedule;
use crate::futures::FuturesMinter;
use crate::token::apply_fee;

/// Post-fee amounts initiated per unlock time and not yet redeemed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionBook {
    by_unlock: BTreeMap<u64, u128>,
    total: u128,
}

impl RedemptionBook {
    pub fn outstanding_at(&self, unlock_time: u64) -> u128 {
        self.by_unlock.get(&unlock_time).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u128)> + '_ {
        self.by_unlock.iter().map(|(k, v)| (*k, *v))
    }

    fn increase(&mut self, unlock_time: u64, amount: u128) -> Result<(), VaultError> {
        let entry = self.by_unlock.entry(unlock_time).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(VaultError::Overflow("redemptions per unlock"))?;
        self.total = self
            .total
            .checked_add(amount)
            .ok_or(VaultError::Overflow("outstanding redemptions"))?;
        Ok(())
    }

    fn decrease(&mut self, unlock_time: u64, amount: u128) -> Result<(), VaultError> {
        let current = self.outstanding_at(unlock_time);
        let left = current
            .checked_sub(amount)
            .ok_or(VaultError::Underflow("redemptions per unlock"))?;
        if left == 0 {
            self.by_unlock.remove(&unlock_time);
        } else {
            self.by_unlock.insert(unlock_time, left);
        }
        self.total = self
            .total
            .checked_sub(amount)
            .ok_or(VaultError::Underflow("outstanding redemptions"))?;
        Ok(())
    }
}

/// Fee and futures terms for redeeming `assets` against one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionQuote {
    pub unlock_time: u64,
    pub assets: u128,
    pub remaining: u64,
    pub fee_percent: u32,
    pub fee: u128,
    pub post_fee: u128,
    pub rounds: u64,
}

/// Compute the terms of a redemption without touching any state.
pub fn quote_redemption(
    clock: &EpochClock,
    fees: &FeeSchedule,
    max_redemption_time: u64,
    unlock_time: u64,
    assets: u128,
    now: u64,
) -> Result<RedemptionQuote, VaultError> {
    let remaining = unlock_time.saturating_sub(now);
    let fee_percent = fees.redemption_fee_percent(remaining, max_redemption_time);
    let (fee, post_fee) = apply_fee(assets, fee_percent)?;
    Ok(RedemptionQuote {
        unlock_time,
        assets,
        remaining,
        fee_percent,
        fee,
        post_fee,
        rounds: clock.whole_rounds(remaining),
    })
}

#[derive(Debug, Clone)]
pub struct RedemptionEngine {
    clock: EpochClock,
    minter: FuturesMinter,
    max_redemption_time: u64,
    primary_asset: AssetId,
    book: RedemptionBook,
}

impl RedemptionEngine {
    pub fn new(clock: EpochClock, max_redemption_time: u64, primary_asset: AssetId) -> Self {
        Self {
            clock,
            minter: FuturesMinter::new(clock),
            max_redemption_time,
            primary_asset,
            book: RedemptionBook::default(),
        }
    }

    pub fn book(&self) -> &RedemptionBook {
        &self.book
    }

    pub fn max_redemption_time(&self) -> u64 {
        self.max_redemption_time
    }

    /// Quote a redemption against the lock at `lock_index`.
    pub fn quote<H: Host>(
        &self,
        host: &H,
        fees: &FeeSchedule,
        lock_index: usize,
        assets: u128,
        now: u64,
    ) -> Result<RedemptionQuote, VaultError> {
        let position = self.live_position(host, lock_index, now)?;
        quote_redemption(
            &self.clock,
            fees,
            self.max_redemption_time,
            position.unlock_time,
            assets,
            now,
        )
    }

    fn live_position<H: Host>(
        &self,
        host: &H,
        lock_index: usize,
        now: u64,
    ) -> Result<LockedPosition, VaultError> {
        let position = host
            .positions()
            .lock_at(lock_index)
            .ok_or(VaultError::InvalidIndices(lock_index))?;
        if position.unlock_time <= now {
            return Err(VaultError::InvalidIndices(lock_index));
        }
        Ok(position)
    }

    /// Primary tokens that may still be redeemed against the live lock at
    /// `lock_index`: its amount less what is already outstanding at its
    /// unlock time.
    pub fn allowance<H: Host>(&self, host: &H, lock_index: usize, now: u64) -> Result<u128, VaultError> {
        let position = self.live_position(host, lock_index, now)?;
        position
            .amount
            .checked_sub(self.book.outstanding_at(position.unlock_time))
            .ok_or(VaultError::Underflow("redemption allowance"))
    }

    /// Redeem `assets[i]` of `caller`'s primary tokens against the lock at
    /// `lock_indexes[i]`, for every i. Deferred claims and futures go to
    /// `receiver`.
    #[allow(clippy::too_many_arguments)]
    pub fn initiate_redemptions<H: Host>(
        &mut self,
        host: &mut H,
        log: &mut EventLog,
        fees: &FeeSchedule,
        lock_indexes: &[usize],
        kind: FuturesKind,
        assets: &[u128],
        receiver: &Address,
        caller: &Address,
        now: u64,
    ) -> Result<Vec<RedemptionQuote>, VaultError> {
        if lock_indexes.is_empty() {
            return Err(VaultError::EmptyArray);
        }
        if lock_indexes.len() != assets.len() {
            return Err(VaultError::MismatchedArrayLengths(lock_indexes.len(), assets.len()));
        }
        receiver.require_non_zero()?;

        let sink_account = host.fee_sink().account();
        let mut quotes = Vec::with_capacity(assets.len());
        for (&lock_index, &amount) in lock_indexes.iter().zip(assets) {
            if amount == 0 {
                return Err(VaultError::ZeroAmount);
            }
            let position = self.live_position(host, lock_index, now)?;
            let unlock_time = position.unlock_time;

            let available = self.allowance(host, lock_index, now)?;
            if amount > available {
                return Err(VaultError::InsufficientRedemptionAllowance {
                    unlock_time,
                    requested: amount,
                    available,
                });
            }

            let quote = quote_redemption(
                &self.clock,
                fees,
                self.max_redemption_time,
                unlock_time,
                amount,
                now,
            )?;

            host.primary_mut().burn(caller, FUNGIBLE, quote.post_fee)?;
            if quote.fee > 0 {
                host.primary_mut()
                    .transfer_from(caller, &sink_account, FUNGIBLE, quote.fee)?;
                host.fee_sink_mut()
                    .distribute(FeeClass::Redemption, &self.primary_asset, quote.fee)?;
            }

            self.book.increase(unlock_time, quote.post_fee)?;
            host.receipts_mut(ReceiptKind::DeferredClaim)
                .mint(receiver, unlock_time, quote.post_fee)?;
            self.minter
                .mint(host, log, quote.rounds, kind, quote.post_fee, receiver, caller, now)?;

            log.emit(
                unlock_time,
                VaultEvent::RedemptionInitiated {
                    actor: *caller,
                    receiver: *receiver,
                    lock_index,
                    assets: amount,
                    fee: quote.fee,
                    post_fee: quote.post_fee,
                    rounds: quote.rounds,
                },
            );
            quotes.push(quote);
        }
        Ok(quotes)
    }

    /// Burn `caller`'s deferred claims for matured unlock times and pay the
    /// total in underlying to `receiver`. Matured locks are released into
    /// custody first. Returns the total paid.
    #[allow(clippy::too_many_arguments)]
    pub fn redeem<H: Host>(
        &mut self,
        host: &mut H,
        log: &mut EventLog,
        custody: &Custody,
        unlock_times: &[u64],
        assets: &[u128],
        receiver: &Address,
        caller: &Address,
        now: u64,
    ) -> Result<u128, VaultError> {
        if unlock_times.is_empty() {
            return Err(VaultError::EmptyArray);
        }
        if unlock_times.len() != assets.len() {
            return Err(VaultError::MismatchedArrayLengths(unlock_times.len(), assets.len()));
        }
        receiver.require_non_zero()?;

        custody.release_expired(host, now)?;

        let mut total: u128 = 0;
        for (&unlock_time, &amount) in unlock_times.iter().zip(assets) {
            if amount == 0 {
                return Err(VaultError::ZeroAmount);
            }
            if now < unlock_time {
                return Err(VaultError::BeforeLockExpiry { unlock_time, now });
            }
            host.receipts_mut(ReceiptKind::DeferredClaim)
                .burn(caller, unlock_time, amount)?;
            self.book.decrease(unlock_time, amount)?;
            total = total
                .checked_add(amount)
                .ok_or(VaultError::Overflow("redeemed total"))?;

            log.emit(
                unlock_time,
                VaultEvent::Redeemed {
                    actor: *caller,
                    receiver: *receiver,
                    amount,
                },
            );
        }

        custody.pay(host, receiver, total)?;
        Ok(total)
    }

    /// Swap `amount` of `caller`'s futures of kind `from` for `epoch` into
    /// the other kind, credited to `receiver`. Only future epochs qualify.
    #[allow(clippy::too_many_arguments)]
    pub fn exchange_futures<H: Host>(
        &self,
        host: &mut H,
        log: &mut EventLog,
        epoch: u64,
        amount: u128,
        receiver: &Address,
        from: FuturesKind,
        caller: &Address,
        now: u64,
    ) -> Result<(), VaultError> {
        let current = self.clock.epoch_at(now);
        if epoch <= current {
            return Err(VaultError::PastExchangePeriod { epoch, current });
        }
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        receiver.require_non_zero()?;

        host.receipts_mut(ReceiptKind::Futures(from))
            .burn(caller, epoch, amount)?;
        host.receipts_mut(ReceiptKind::Futures(from.other()))
            .mint(receiver, epoch, amount)?;

        log.emit(
            epoch,
            VaultEvent::FuturesExchanged {
                actor: *caller,
                receiver: *receiver,
                from,
                amount,
            },
        );
        Ok(())
    }
}
