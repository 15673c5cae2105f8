//! Read-time aggregations over the in-memory collections.
//!
//! Every function here is a pure fold over a slice; nothing is cached. The
//! data scale is personal finance, so recomputing on every render is fine.

use std::{collections::HashMap, ops::RangeInclusive};

use time::Date;

use crate::{
    debt::Debt,
    earning::{Earning, Recurrence},
    lending::{Lending, LendingStatus},
    transaction::{Transaction, TransactionKind},
};

/// Sum the amounts of the transactions matching `predicate`.
pub fn total_with(
    transactions: &[Transaction],
    predicate: impl Fn(&Transaction) -> bool,
) -> f64 {
    transactions
        .iter()
        .filter(|transaction| predicate(transaction))
        .map(|transaction| transaction.amount)
        .sum()
}

/// Sum the expenses in each category over `date_range`.
pub fn sum_by_category(
    transactions: &[Transaction],
    date_range: RangeInclusive<Date>,
) -> HashMap<String, f64> {
    let mut totals = HashMap::new();

    for transaction in transactions {
        if transaction.kind == TransactionKind::Expense && date_range.contains(&transaction.date) {
            *totals.entry(transaction.category.clone()).or_insert(0.0) += transaction.amount;
        }
    }

    totals
}

/// The sum of all outstanding debt balances.
pub fn total_debt_outstanding(debts: &[Debt]) -> f64 {
    debts.iter().map(|debt| debt.current_balance).sum()
}

/// The sum of lent amounts that have not been paid back yet.
pub fn total_lent_pending(lending: &[Lending]) -> f64 {
    lending
        .iter()
        .filter(|record| record.status == LendingStatus::Pending)
        .map(|record| record.amount)
        .sum()
}

/// The sum of earnings that repeat monthly.
pub fn monthly_recurring_earnings(earnings: &[Earning]) -> f64 {
    earnings
        .iter()
        .filter(|earning| earning.recurrence == Recurrence::Monthly)
        .map(|earning| earning.amount)
        .sum()
}
