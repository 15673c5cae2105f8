//! The lending collection: money lent out to other people.

use axum::{Json, extract::State, http::StatusCode, response::Response};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, RecordId,
    api::{DeleteBody, error_response, ok_empty_response, ok_response},
    session::Record,
};

/// Whether a lent amount has been paid back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LendingStatus {
    /// The borrower still owes the money.
    Pending,
    /// The borrower has paid the money back.
    Paid,
}

impl LendingStatus {
    fn as_str(&self) -> &'static str {
        match self {
            LendingStatus::Pending => "Pending",
            LendingStatus::Paid => "Paid",
        }
    }
}

impl rusqlite::types::ToSql for LendingStatus {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl rusqlite::types::FromSql for LendingStatus {
    fn column_result(
        value: rusqlite::types::ValueRef<'_>,
    ) -> rusqlite::types::FromSqlResult<Self> {
        match value.as_str()? {
            "Pending" => Ok(LendingStatus::Pending),
            "Paid" => Ok(LendingStatus::Paid),
            other => Err(rusqlite::types::FromSqlError::Other(
                format!("invalid lending status {other:?}").into(),
            )),
        }
    }
}

/// Money lent to a named borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lending {
    /// The id assigned when the record was created.
    pub id: RecordId,
    /// Who the money was lent to.
    pub borrower: String,
    /// The amount lent, never negative.
    pub amount: f64,
    /// Whether the money has come back.
    pub status: LendingStatus,
    /// When the money was lent.
    pub date: Date,
}

/// A lending record as submitted for creation, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLending {
    /// Who the money was lent to.
    pub borrower: String,
    /// The amount lent, never negative.
    pub amount: f64,
    /// Whether the money has come back.
    pub status: LendingStatus,
    /// When the money was lent.
    pub date: Date,
}

impl Record for Lending {
    const COLLECTION: &'static str = "lending";

    type New = NewLending;

    fn id(&self) -> RecordId {
        self.id
    }
}

pub(crate) fn create_lending_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS lending (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            borrower TEXT NOT NULL,
            amount REAL NOT NULL,
            status TEXT NOT NULL,
            date TEXT NOT NULL
        );",
        (),
    )?;

    Ok(())
}

fn map_lending_row(row: &Row) -> Result<Lending, rusqlite::Error> {
    Ok(Lending {
        id: row.get(0)?,
        borrower: row.get(1)?,
        amount: row.get(2)?,
        status: row.get(3)?,
        date: row.get(4)?,
    })
}

/// Create a lending record in the database.
///
/// # Errors
/// Returns an [Error::NegativeAmount] if the amount is negative, or an
/// [Error::SqlError] if there is an SQL error.
pub fn create_lending(new_lending: NewLending, connection: &Connection) -> Result<Lending, Error> {
    if new_lending.amount < 0.0 {
        return Err(Error::NegativeAmount(new_lending.amount));
    }

    connection.execute(
        "INSERT INTO lending (borrower, amount, status, date) VALUES (?1, ?2, ?3, ?4);",
        (
            &new_lending.borrower,
            new_lending.amount,
            new_lending.status,
            new_lending.date,
        ),
    )?;

    Ok(Lending {
        id: RecordId::new(connection.last_insert_rowid()),
        borrower: new_lending.borrower,
        amount: new_lending.amount,
        status: new_lending.status,
        date: new_lending.date,
    })
}

/// Retrieve all lending records in creation order.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn list_lending(connection: &Connection) -> Result<Vec<Lending>, Error> {
    connection
        .prepare("SELECT id, borrower, amount, status, date FROM lending;")?
        .query_map([], map_lending_row)?
        .map(|maybe_lending| maybe_lending.map_err(|error| error.into()))
        .collect()
}

/// Replace the non-identifier fields of a lending record.
///
/// # Errors
/// Returns an [Error::NotFound] if the record does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn replace_lending(lending: &Lending, connection: &Connection) -> Result<(), Error> {
    if lending.amount < 0.0 {
        return Err(Error::NegativeAmount(lending.amount));
    }

    let rows_affected = connection.execute(
        "UPDATE lending SET borrower = ?1, amount = ?2, status = ?3, date = ?4 WHERE id = ?5;",
        (
            &lending.borrower,
            lending.amount,
            lending.status,
            lending.date,
            lending.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete a lending record from the database.
///
/// # Errors
/// Returns an [Error::NotFound] if the record does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn delete_lending(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM lending WHERE id = ?1;", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// A route handler that lists all lending records.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_lending_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_lending(&connection) {
        Ok(lending) => ok_response(StatusCode::OK, lending),
        Err(error) => error_response(error, "fetch lending records"),
    }
}

/// A route handler that creates a lending record.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_lending_endpoint(
    State(state): State<AppState>,
    Json(new_lending): Json<NewLending>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match create_lending(new_lending, &connection) {
        Ok(lending) => ok_response(StatusCode::CREATED, lending),
        Err(error) => error_response(error, "add lending record"),
    }
}

/// A route handler that replaces a lending record keyed by the id in the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_lending_endpoint(
    State(state): State<AppState>,
    Json(lending): Json<Lending>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match replace_lending(&lending, &connection) {
        Ok(()) => ok_response(StatusCode::OK, lending),
        Err(error) => error_response(error, "update lending record"),
    }
}

/// A route handler that deletes the lending record named by the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_lending_endpoint(
    State(state): State<AppState>,
    Json(body): Json<DeleteBody>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_lending(body.id, &connection) {
        Ok(()) => ok_empty_response(),
        Err(error) => error_response(error, "delete lending record"),
    }
}

#[cfg(test)]
mod lending_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, initialize_db};

    use super::{LendingStatus, NewLending, create_lending, delete_lending, list_lending,
        replace_lending};

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn status_serializes_capitalized() {
        let json = serde_json::to_string(&LendingStatus::Pending).unwrap();
        assert_eq!(json, "\"Pending\"");

        let status: LendingStatus = serde_json::from_str("\"Paid\"").unwrap();
        assert_eq!(status, LendingStatus::Paid);
    }

    #[test]
    fn marking_paid_round_trips() {
        let connection = get_test_connection();
        let mut lending = create_lending(
            NewLending {
                borrower: "Sam".to_owned(),
                amount: 250.0,
                status: LendingStatus::Pending,
                date: date!(2025 - 04 - 10),
            },
            &connection,
        )
        .unwrap();

        lending.status = LendingStatus::Paid;
        replace_lending(&lending, &connection).unwrap();

        assert_eq!(list_lending(&connection).unwrap()[0].status, LendingStatus::Paid);
    }

    #[test]
    fn delete_missing_record_is_not_found() {
        let connection = get_test_connection();
        let lending = create_lending(
            NewLending {
                borrower: "Sam".to_owned(),
                amount: 250.0,
                status: LendingStatus::Pending,
                date: date!(2025 - 04 - 10),
            },
            &connection,
        )
        .unwrap();
        delete_lending(lending.id, &connection).unwrap();

        assert_eq!(delete_lending(lending.id, &connection), Err(Error::NotFound));
    }
}
