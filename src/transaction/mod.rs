//! The transaction collection: money movement events and their CRUD endpoints.
//!
//! Transactions are the causal input to the derived channel balances, see
//! [crate::balance::recompute].

mod db;
mod endpoints;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{RecordId, session::Record};

pub use db::{
    create_transaction, delete_transaction, get_transaction, list_transactions,
    replace_transaction,
};
pub(crate) use db::create_transaction_table;
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
    replace_transaction_endpoint,
};

/// Whether a transaction brought money in or spent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money came in.
    Income,
    /// Money was spent.
    Expense,
}

/// How a transaction was paid, determining which balance sub-account it
/// affects (card/other map to bank).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentChannel {
    /// Card payment, settles against the bank balance.
    Card,
    /// Physical cash.
    Cash,
    /// UPI transfer.
    Upi,
    /// Anything else, settles against the bank balance.
    Other,
    /// A channel value this version does not recognize. Ignored by balance
    /// derivation.
    #[serde(other)]
    Unknown,
}

impl TransactionKind {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl rusqlite::types::ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl rusqlite::types::FromSql for TransactionKind {
    fn column_result(
        value: rusqlite::types::ValueRef<'_>,
    ) -> rusqlite::types::FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(rusqlite::types::FromSqlError::Other(
                format!("invalid transaction kind {other:?}").into(),
            )),
        }
    }
}

impl PaymentChannel {
    fn as_str(&self) -> &'static str {
        match self {
            PaymentChannel::Card => "card",
            PaymentChannel::Cash => "cash",
            PaymentChannel::Upi => "upi",
            PaymentChannel::Other => "other",
            PaymentChannel::Unknown => "unknown",
        }
    }
}

impl rusqlite::types::ToSql for PaymentChannel {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl rusqlite::types::FromSql for PaymentChannel {
    fn column_result(
        value: rusqlite::types::ValueRef<'_>,
    ) -> rusqlite::types::FromSqlResult<Self> {
        // Channel values written by a newer revision must not make old rows
        // unreadable, so anything unrecognized maps to Unknown.
        Ok(match value.as_str()? {
            "card" => PaymentChannel::Card,
            "cash" => PaymentChannel::Cash,
            "upi" => PaymentChannel::Upi,
            "other" => PaymentChannel::Other,
            _ => PaymentChannel::Unknown,
        })
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The amount is always a non-negative magnitude; the sign is derived from
/// [Transaction::kind] at use sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The id assigned when the transaction was created.
    pub id: RecordId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The magnitude of money moved, never negative.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A free-form category label, e.g. "Groceries".
    pub category: String,
    /// Whether this was income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// How the transaction was paid.
    #[serde(rename = "paymentMethod")]
    pub channel: PaymentChannel,
}

/// A transaction as submitted for creation, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The magnitude of money moved, never negative.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A free-form category label.
    pub category: String,
    /// Whether this was income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// How the transaction was paid.
    #[serde(rename = "paymentMethod")]
    pub channel: PaymentChannel,
}

impl Transaction {
    /// The amount with its sign applied: positive for income, negative for
    /// expenses.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

impl Record for Transaction {
    const COLLECTION: &'static str = "transactions";

    type New = NewTransaction;

    fn id(&self) -> RecordId {
        self.id
    }
}

#[cfg(test)]
mod wire_format_tests {
    use time::macros::date;

    use crate::RecordId;

    use super::{PaymentChannel, Transaction, TransactionKind};

    #[test]
    fn serializes_with_original_field_names() {
        let transaction = Transaction {
            id: RecordId::new(1),
            description: "Coffee".to_owned(),
            amount: 4.5,
            date: date!(2025 - 06 - 01),
            category: "Food".to_owned(),
            kind: TransactionKind::Expense,
            channel: PaymentChannel::Card,
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["type"], "expense");
        assert_eq!(json["paymentMethod"], "card");
        assert_eq!(json["id"], "1");
        assert_eq!(json["date"], "2025-06-01");
    }

    #[test]
    fn unrecognized_channel_becomes_unknown() {
        let json = r#"{
            "id": "7",
            "description": "Voucher",
            "amount": 10.0,
            "date": "2025-01-15",
            "category": "Misc",
            "type": "expense",
            "paymentMethod": "cheque"
        }"#;

        let transaction: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(transaction.channel, PaymentChannel::Unknown);
    }

    #[test]
    fn signed_amount_follows_kind() {
        let mut transaction = Transaction {
            id: RecordId::new(1),
            description: String::new(),
            amount: 25.0,
            date: date!(2025 - 06 - 01),
            category: String::new(),
            kind: TransactionKind::Income,
            channel: PaymentChannel::Cash,
        };
        assert_eq!(transaction.signed_amount(), 25.0);

        transaction.kind = TransactionKind::Expense;
        assert_eq!(transaction.signed_amount(), -25.0);
    }
}
