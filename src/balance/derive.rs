//! Deriving current channel balances from transaction history.
//!
//! The fold rule: each transaction contributes its signed amount (positive for
//! income, negative for expenses) to the sub-account selected by its payment
//! channel. Card and other payments settle against the bank balance; a channel
//! this version does not recognize affects no sub-account.

use time::Date;

use crate::transaction::{PaymentChannel, Transaction};

use super::BalanceSnapshot;

/// The bank/upi/cash sub-balances at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelBalances {
    /// Money held at the bank.
    pub bank: f64,
    /// Money held in the UPI account.
    pub upi: f64,
    /// Physical cash on hand.
    pub cash: f64,
}

/// Apply the effect of one transaction to `balances`.
///
/// `factor` is +1.0 to apply the transaction and -1.0 to revert it, so that
/// `adjust(adjust(b, t, +1), t, -1)` is the identity. Update and delete build
/// on this: reverting the original and applying the replacement keeps the
/// balances consistent with a recomputation from scratch.
pub fn adjust(balances: &mut ChannelBalances, transaction: &Transaction, factor: f64) {
    let change = transaction.signed_amount() * factor;

    match transaction.channel {
        PaymentChannel::Upi => balances.upi += change,
        PaymentChannel::Cash => balances.cash += change,
        PaymentChannel::Card | PaymentChannel::Other => balances.bank += change,
        PaymentChannel::Unknown => {}
    }
}

/// Fold `transactions` over a base balance.
pub fn recompute(base: ChannelBalances, transactions: &[Transaction]) -> ChannelBalances {
    let mut balances = base;

    for transaction in transactions {
        adjust(&mut balances, transaction, 1.0);
    }

    balances
}

/// Derive the balances as of `today` from the most recent snapshot.
///
/// Only transactions dated strictly after the snapshot date and no later than
/// `today` are folded in; anything on or before the snapshot date is assumed
/// to already be reflected in it. With no snapshot, the fold starts from zero
/// and includes every transaction up to `today`.
pub fn current_balances(
    snapshot: Option<&BalanceSnapshot>,
    transactions: &[Transaction],
    today: Date,
) -> ChannelBalances {
    let (base, cutoff) = match snapshot {
        Some(snapshot) => (snapshot.channels(), Some(snapshot.date)),
        None => (ChannelBalances::default(), None),
    };

    let mut balances = base;
    for transaction in transactions {
        let after_snapshot = cutoff.is_none_or(|cutoff| transaction.date > cutoff);
        if after_snapshot && transaction.date <= today {
            adjust(&mut balances, transaction, 1.0);
        }
    }

    balances
}

#[cfg(test)]
mod derive_tests {
    use time::macros::date;

    use crate::{
        RecordId,
        balance::BalanceSnapshot,
        transaction::{PaymentChannel, Transaction, TransactionKind},
    };

    use super::{ChannelBalances, adjust, current_balances, recompute};

    fn transaction(amount: f64, kind: TransactionKind, channel: PaymentChannel) -> Transaction {
        Transaction {
            id: RecordId::new(1),
            description: String::new(),
            amount,
            date: date!(2025 - 06 - 15),
            category: String::new(),
            kind,
            channel,
        }
    }

    #[test]
    fn card_expense_debits_bank() {
        let base = ChannelBalances {
            bank: 1000.0,
            upi: 0.0,
            cash: 0.0,
        };
        let spend = transaction(100.0, TransactionKind::Expense, PaymentChannel::Card);

        let balances = recompute(base, &[spend]);

        assert_eq!(balances.bank, 900.0);
        assert_eq!(balances.upi, 0.0);
        assert_eq!(balances.cash, 0.0);
    }

    #[test]
    fn upi_income_credits_upi_only() {
        let base = ChannelBalances {
            bank: 900.0,
            upi: 0.0,
            cash: 0.0,
        };
        let income = transaction(50.0, TransactionKind::Income, PaymentChannel::Upi);

        let balances = recompute(base, &[income]);

        assert_eq!(balances.upi, 50.0);
        assert_eq!(balances.bank, 900.0);
    }

    #[test]
    fn other_channel_settles_against_bank() {
        let base = ChannelBalances::default();
        let spend = transaction(30.0, TransactionKind::Expense, PaymentChannel::Other);

        let balances = recompute(base, &[spend]);

        assert_eq!(balances.bank, -30.0);
    }

    #[test]
    fn unknown_channel_is_ignored() {
        let base = ChannelBalances {
            bank: 100.0,
            upi: 100.0,
            cash: 100.0,
        };
        let spend = transaction(30.0, TransactionKind::Expense, PaymentChannel::Unknown);

        let balances = recompute(base, &[spend]);

        assert_eq!(balances, base);
    }

    #[test]
    fn recompute_equals_incremental_adjust() {
        let base = ChannelBalances {
            bank: 250.0,
            upi: 40.0,
            cash: 10.0,
        };
        let history = vec![
            transaction(100.0, TransactionKind::Expense, PaymentChannel::Card),
            transaction(20.0, TransactionKind::Income, PaymentChannel::Cash),
            transaction(5.0, TransactionKind::Expense, PaymentChannel::Upi),
        ];
        let added = transaction(75.0, TransactionKind::Income, PaymentChannel::Upi);

        let mut incremental = recompute(base, &history);
        adjust(&mut incremental, &added, 1.0);

        let mut full_history = history;
        full_history.push(added);
        let from_scratch = recompute(base, &full_history);

        assert_eq!(incremental, from_scratch);
    }

    #[test]
    fn apply_then_revert_is_identity() {
        let base = ChannelBalances {
            bank: 123.0,
            upi: 45.0,
            cash: 6.0,
        };
        let spend = transaction(88.0, TransactionKind::Expense, PaymentChannel::Card);

        let mut balances = base;
        adjust(&mut balances, &spend, 1.0);
        adjust(&mut balances, &spend, -1.0);

        assert_eq!(balances, base);
    }

    #[test]
    fn current_balances_excludes_transactions_on_or_before_snapshot() {
        let snapshot = BalanceSnapshot {
            id: RecordId::new(1),
            date: date!(2025 - 06 - 01),
            bank: 1000.0,
            upi: 0.0,
            cash: 0.0,
        };
        let mut before = transaction(500.0, TransactionKind::Expense, PaymentChannel::Card);
        before.date = date!(2025 - 05 - 20);
        let mut on_the_day = transaction(200.0, TransactionKind::Expense, PaymentChannel::Card);
        on_the_day.date = date!(2025 - 06 - 01);
        let mut after = transaction(100.0, TransactionKind::Expense, PaymentChannel::Card);
        after.date = date!(2025 - 06 - 10);

        let balances = current_balances(
            Some(&snapshot),
            &[before, on_the_day, after],
            date!(2025 - 06 - 30),
        );

        assert_eq!(balances.bank, 900.0);
    }

    #[test]
    fn current_balances_excludes_future_transactions() {
        let snapshot = BalanceSnapshot {
            id: RecordId::new(1),
            date: date!(2025 - 06 - 01),
            bank: 1000.0,
            upi: 0.0,
            cash: 0.0,
        };
        let mut future = transaction(100.0, TransactionKind::Expense, PaymentChannel::Card);
        future.date = date!(2025 - 07 - 15);

        let balances = current_balances(Some(&snapshot), &[future], date!(2025 - 06 - 30));

        assert_eq!(balances.bank, 1000.0);
    }

    #[test]
    fn current_balances_without_snapshot_folds_from_zero() {
        let income = transaction(40.0, TransactionKind::Income, PaymentChannel::Cash);

        let balances = current_balances(None, &[income], date!(2025 - 06 - 30));

        assert_eq!(balances.cash, 40.0);
        assert_eq!(balances.bank, 0.0);
    }
}
