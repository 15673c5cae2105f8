//! The balance collection and the derived-balance fold.
//!
//! Balances are stored as an independent snapshot series: one row per recorded
//! date, each holding the three channel sub-balances. The most recent snapshot
//! is "current"; [derive::current_balances] folds newer transactions over it to
//! approximate the balance as of today.

mod db;
pub mod derive;
mod endpoints;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{RecordId, session::Record};

pub use db::{
    create_balance, delete_balance, get_balance, list_balances, replace_balance,
};
pub(crate) use db::create_balance_table;
pub use derive::{ChannelBalances, adjust, current_balances, recompute};
pub use endpoints::{
    create_balance_endpoint, delete_balance_endpoint, list_balances_endpoint,
    replace_balance_endpoint,
};

/// The three channel sub-balances as recorded on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// The id assigned when the snapshot was created.
    pub id: RecordId,
    /// The date the snapshot was recorded for.
    pub date: Date,
    /// Money held at the bank (card and other payments settle here).
    pub bank: f64,
    /// Money held in the UPI account.
    pub upi: f64,
    /// Physical cash on hand.
    pub cash: f64,
}

/// A balance snapshot as submitted for creation, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBalanceSnapshot {
    /// The date the snapshot is recorded for.
    pub date: Date,
    /// Money held at the bank.
    pub bank: f64,
    /// Money held in the UPI account.
    pub upi: f64,
    /// Physical cash on hand.
    pub cash: f64,
}

impl BalanceSnapshot {
    /// The sub-balances of this snapshot without its identity.
    pub fn channels(&self) -> ChannelBalances {
        ChannelBalances {
            bank: self.bank,
            upi: self.upi,
            cash: self.cash,
        }
    }
}

impl Record for BalanceSnapshot {
    const COLLECTION: &'static str = "balances";

    type New = NewBalanceSnapshot;

    fn id(&self) -> RecordId {
        self.id
    }
}
