// crates/epochvault-economics/src/futures.rs
//
// Futures minting: forward-dated receipts, one batch per future epoch.
//
// Minting `rounds` futures at time t credits `amount` of the chosen kind for
// each of the epochs epoch(t) + D, epoch(t) + 2D, ..., epoch(t) + rounds*D.
// The current epoch is never included.

use epochvault_core::error::VaultError;
use epochvault_core::receipt::{FuturesKind, ReceiptKind};
use epochvault_core::traits::{BalanceLedger, Host};
use epochvault_core::Address;

use crate::clock::EpochClock;
use crate::events::{EventLog, VaultEvent};

#[derive(Debug, Clone, Copy)]
pub struct FuturesMinter {
    clock: EpochClock,
}

impl FuturesMinter {
    pub fn new(clock: EpochClock) -> Self {
        Self { clock }
    }

    /// Mint `amount` futures of `kind` to `receiver` for each of the next
    /// `rounds` epochs. Returns the epoch keys minted, in order.
    ///
    /// Zero rounds or a zero amount mints nothing and emits nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn mint<H: Host>(
        &self,
        host: &mut H,
        log: &mut EventLog,
        rounds: u64,
        kind: FuturesKind,
        amount: u128,
        receiver: &Address,
        actor: &Address,
        now: u64,
    ) -> Result<Vec<u64>, VaultError> {
        if rounds == 0 || amount == 0 {
            return Ok(Vec::new());
        }
        // Reject an unrepresentable horizon before touching the ledger.
        self.clock.epochs_ahead(now, rounds)?;

        let ledger = host.receipts_mut(ReceiptKind::Futures(kind));
        let mut minted = Vec::new();
        for round in 1..=rounds {
            let epoch = self.clock.epochs_ahead(now, round)?;
            ledger.mint(receiver, epoch, amount)?;
            minted.push(epoch);
        }

        log.emit(
            self.clock.epoch_at(now),
            VaultEvent::FuturesMinted {
                actor: *actor,
                receiver: *receiver,
                futures: kind,
                rounds,
                amount,
            },
        );
        Ok(minted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epochvault_store::MemoryHost;

    const D: u64 = 1_000;

    fn setup() -> (MemoryHost, EventLog, FuturesMinter) {
        let host = MemoryHost::new(D, 16 * D);
        let minter = FuturesMinter::new(EpochClock::new(D).unwrap());
        (host, EventLog::new(), minter)
    }

    #[test]
    fn test_mints_one_batch_per_future_epoch() {
        let (mut host, mut log, minter) = setup();
        let alice = Address::from_label("alice");

        let epochs = minter
            .mint(&mut host, &mut log, 3, FuturesKind::Reward, 50, &alice, &alice, 2 * D + 10)
            .unwrap();

        assert_eq!(epochs, vec![3 * D, 4 * D, 5 * D]);
        let ledger = host.receipts(ReceiptKind::Futures(FuturesKind::Reward));
        assert_eq!(ledger.balance_of(&alice, 2 * D), 0);
        for epoch in epochs {
            assert_eq!(ledger.balance_of(&alice, epoch), 50);
        }
        assert_eq!(ledger.balance_of(&alice, 6 * D), 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_zero_rounds_is_a_no_op() {
        let (mut host, mut log, minter) = setup();
        let alice = Address::from_label("alice");

        let epochs = minter
            .mint(&mut host, &mut log, 0, FuturesKind::Vote, 50, &alice, &alice, 0)
            .unwrap();

        assert!(epochs.is_empty());
        assert!(log.is_empty());
        assert_eq!(
            host.receipts(ReceiptKind::Futures(FuturesKind::Vote))
                .total_supply(D),
            0
        );
    }

    #[test]
    fn test_kinds_are_kept_apart() {
        let (mut host, mut log, minter) = setup();
        let alice = Address::from_label("alice");

        minter
            .mint(&mut host, &mut log, 1, FuturesKind::Vote, 9, &alice, &alice, 0)
            .unwrap();

        assert_eq!(
            host.receipts(ReceiptKind::Futures(FuturesKind::Vote))
                .balance_of(&alice, D),
            9
        );
        assert_eq!(
            host.receipts(ReceiptKind::Futures(FuturesKind::Reward))
                .balance_of(&alice, D),
            0
        );
    }
}
