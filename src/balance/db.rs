//! SQLite persistence for balance snapshots.

use rusqlite::{Connection, Row};

use crate::{Error, RecordId};

use super::{BalanceSnapshot, NewBalanceSnapshot};

pub(crate) fn create_balance_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS balance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            bank REAL NOT NULL,
            upi REAL NOT NULL,
            cash REAL NOT NULL
        );",
        (),
    )?;

    Ok(())
}

fn map_balance_row(row: &Row) -> Result<BalanceSnapshot, rusqlite::Error> {
    Ok(BalanceSnapshot {
        id: row.get(0)?,
        date: row.get(1)?,
        bank: row.get(2)?,
        upi: row.get(3)?,
        cash: row.get(4)?,
    })
}

/// Create a balance snapshot in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn create_balance(
    new_balance: NewBalanceSnapshot,
    connection: &Connection,
) -> Result<BalanceSnapshot, Error> {
    connection.execute(
        "INSERT INTO balance (date, bank, upi, cash) VALUES (?1, ?2, ?3, ?4);",
        (
            new_balance.date,
            new_balance.bank,
            new_balance.upi,
            new_balance.cash,
        ),
    )?;

    Ok(BalanceSnapshot {
        id: RecordId::new(connection.last_insert_rowid()),
        date: new_balance.date,
        bank: new_balance.bank,
        upi: new_balance.upi,
        cash: new_balance.cash,
    })
}

/// Retrieve a balance snapshot by its `id`.
///
/// # Errors
/// Returns an [Error::NotFound] if `id` does not refer to a snapshot, or an
/// [Error::SqlError] if there is some other SQL error.
pub fn get_balance(id: RecordId, connection: &Connection) -> Result<BalanceSnapshot, Error> {
    connection
        .prepare("SELECT id, date, bank, upi, cash FROM balance WHERE id = :id;")?
        .query_row(&[(":id", &id)], map_balance_row)
        .map_err(|error| error.into())
}

/// Retrieve all balance snapshots, most recent first.
///
/// The first element, when present, is the "current" balance.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn list_balances(connection: &Connection) -> Result<Vec<BalanceSnapshot>, Error> {
    connection
        .prepare("SELECT id, date, bank, upi, cash FROM balance ORDER BY date DESC, id DESC;")?
        .query_map([], map_balance_row)?
        .map(|maybe_balance| maybe_balance.map_err(|error| error.into()))
        .collect()
}

/// Replace the non-identifier fields of a balance snapshot.
///
/// # Errors
/// Returns an [Error::NotFound] if the snapshot does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn replace_balance(balance: &BalanceSnapshot, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE balance SET date = ?1, bank = ?2, upi = ?3, cash = ?4 WHERE id = ?5;",
        (
            balance.date,
            balance.bank,
            balance.upi,
            balance.cash,
            balance.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete a balance snapshot from the database.
///
/// # Errors
/// Returns an [Error::NotFound] if the snapshot does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn delete_balance(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM balance WHERE id = ?1;", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
