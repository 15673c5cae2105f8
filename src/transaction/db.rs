//! SQLite persistence for transactions.

use rusqlite::{Connection, Row};

use crate::{Error, RecordId};

use super::{NewTransaction, Transaction};

pub(crate) fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            kind TEXT NOT NULL,
            channel TEXT NOT NULL
        );",
        (),
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        category: row.get(4)?,
        kind: row.get(5)?,
        channel: row.get(6)?,
    })
}

/// Create a transaction in the database.
///
/// # Errors
/// Returns [Error::NegativeAmount] if the amount is negative, or
/// [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if new_transaction.amount < 0.0 {
        return Err(Error::NegativeAmount(new_transaction.amount));
    }

    connection.execute(
        "INSERT INTO \"transaction\" (description, amount, date, category, kind, channel)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        (
            &new_transaction.description,
            new_transaction.amount,
            new_transaction.date,
            &new_transaction.category,
            new_transaction.kind,
            new_transaction.channel,
        ),
    )?;

    let id = RecordId::new(connection.last_insert_rowid());

    Ok(Transaction {
        id,
        description: new_transaction.description,
        amount: new_transaction.amount,
        date: new_transaction.date,
        category: new_transaction.category,
        kind: new_transaction.kind,
        channel: new_transaction.channel,
    })
}

/// Retrieve a transaction in the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: RecordId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, date, category, kind, channel
             FROM \"transaction\" WHERE id = :id;",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Retrieve all transactions, most recent first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn list_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, date, category, kind, channel
             FROM \"transaction\" ORDER BY date DESC, id DESC;",
        )?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Replace the non-identifier fields of a transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - [Error::NotFound] if the transaction does not exist,
/// - or [Error::SqlError] if there is an SQL error.
pub fn replace_transaction(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<(), Error> {
    if transaction.amount < 0.0 {
        return Err(Error::NegativeAmount(transaction.amount));
    }

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET description = ?1, amount = ?2, date = ?3, category = ?4, kind = ?5, channel = ?6
         WHERE id = ?7;",
        (
            &transaction.description,
            transaction.amount,
            transaction.date,
            &transaction.category,
            transaction.kind,
            transaction.channel,
            transaction.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete a transaction from the database.
///
/// # Errors
/// This function will return an [Error::NotFound] if the transaction does not
/// exist, or an [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1;", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod transaction_db_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, initialize_db,
        transaction::{NewTransaction, PaymentChannel, TransactionKind},
    };

    use super::{
        create_transaction, delete_transaction, get_transaction, list_transactions,
        replace_transaction,
    };

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");
        connection
    }

    fn sample(description: &str, amount: f64) -> NewTransaction {
        NewTransaction {
            description: description.to_owned(),
            amount,
            date: date!(2025 - 05 - 20),
            category: "Groceries".to_owned(),
            kind: TransactionKind::Expense,
            channel: PaymentChannel::Card,
        }
    }

    #[test]
    fn create_assigns_id_and_round_trips() {
        let connection = get_test_connection();

        let created = create_transaction(sample("Weekly shop", 82.40), &connection).unwrap();

        let fetched = get_transaction(created.id, &connection).unwrap();
        assert_eq!(created, fetched);
    }

    #[test]
    fn create_rejects_negative_amount() {
        let connection = get_test_connection();

        let result = create_transaction(sample("Refund", -10.0), &connection);

        assert_eq!(result, Err(Error::NegativeAmount(-10.0)));
    }

    #[test]
    fn list_is_ordered_most_recent_first() {
        let connection = get_test_connection();
        let mut older = sample("Older", 1.0);
        older.date = date!(2025 - 01 - 01);
        let mut newer = sample("Newer", 2.0);
        newer.date = date!(2025 - 03 - 01);
        create_transaction(older, &connection).unwrap();
        create_transaction(newer, &connection).unwrap();

        let transactions = list_transactions(&connection).unwrap();

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].description, "Newer");
        assert_eq!(transactions[1].description, "Older");
    }

    #[test]
    fn replace_overwrites_all_fields() {
        let connection = get_test_connection();
        let mut transaction = create_transaction(sample("Dinner", 30.0), &connection).unwrap();

        transaction.amount = 45.0;
        transaction.kind = TransactionKind::Income;
        transaction.channel = PaymentChannel::Upi;
        replace_transaction(&transaction, &connection).unwrap();

        let fetched = get_transaction(transaction.id, &connection).unwrap();
        assert_eq!(fetched, transaction);
    }

    #[test]
    fn replace_missing_transaction_is_not_found() {
        let connection = get_test_connection();
        let mut transaction = create_transaction(sample("Dinner", 30.0), &connection).unwrap();
        delete_transaction(transaction.id, &connection).unwrap();

        transaction.amount = 45.0;
        let result = replace_transaction(&transaction, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_transaction_is_not_found() {
        let connection = get_test_connection();
        let transaction = create_transaction(sample("Dinner", 30.0), &connection).unwrap();
        delete_transaction(transaction.id, &connection).unwrap();

        let result = delete_transaction(transaction.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(
            get_transaction(transaction.id, &connection),
            Err(Error::NotFound)
        );
    }
}
