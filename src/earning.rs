//! The earnings collection: income sources, one-off or recurring.

use axum::{Json, extract::State, http::StatusCode, response::Response};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, RecordId,
    api::{DeleteBody, error_response, ok_empty_response, ok_response},
    session::Record,
};

/// How often an earning repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    /// A single payment.
    #[serde(rename = "one-time")]
    OneTime,
    /// Repeats every month, e.g. a salary.
    #[serde(rename = "monthly")]
    Monthly,
}

impl Recurrence {
    fn as_str(&self) -> &'static str {
        match self {
            Recurrence::OneTime => "one-time",
            Recurrence::Monthly => "monthly",
        }
    }
}

impl rusqlite::types::ToSql for Recurrence {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl rusqlite::types::FromSql for Recurrence {
    fn column_result(
        value: rusqlite::types::ValueRef<'_>,
    ) -> rusqlite::types::FromSqlResult<Self> {
        match value.as_str()? {
            "one-time" => Ok(Recurrence::OneTime),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(rusqlite::types::FromSqlError::Other(
                format!("invalid recurrence {other:?}").into(),
            )),
        }
    }
}

/// A source of income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Earning {
    /// The id assigned when the earning was created.
    pub id: RecordId,
    /// What the income is, e.g. "Salary".
    pub description: String,
    /// The amount earned, never negative.
    pub amount: f64,
    /// When the earning was (first) received.
    pub date: Date,
    /// Whether the earning repeats.
    #[serde(rename = "type")]
    pub recurrence: Recurrence,
}

/// An earning as submitted for creation, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEarning {
    /// What the income is.
    pub description: String,
    /// The amount earned, never negative.
    pub amount: f64,
    /// When the earning was (first) received.
    pub date: Date,
    /// Whether the earning repeats.
    #[serde(rename = "type")]
    pub recurrence: Recurrence,
}

impl Record for Earning {
    const COLLECTION: &'static str = "earnings";

    type New = NewEarning;

    fn id(&self) -> RecordId {
        self.id
    }
}

pub(crate) fn create_earning_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS earning (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            recurrence TEXT NOT NULL
        );",
        (),
    )?;

    Ok(())
}

fn map_earning_row(row: &Row) -> Result<Earning, rusqlite::Error> {
    Ok(Earning {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        recurrence: row.get(4)?,
    })
}

/// Create an earning in the database.
///
/// # Errors
/// Returns an [Error::NegativeAmount] if the amount is negative, or an
/// [Error::SqlError] if there is an SQL error.
pub fn create_earning(new_earning: NewEarning, connection: &Connection) -> Result<Earning, Error> {
    if new_earning.amount < 0.0 {
        return Err(Error::NegativeAmount(new_earning.amount));
    }

    connection.execute(
        "INSERT INTO earning (description, amount, date, recurrence) VALUES (?1, ?2, ?3, ?4);",
        (
            &new_earning.description,
            new_earning.amount,
            new_earning.date,
            new_earning.recurrence,
        ),
    )?;

    Ok(Earning {
        id: RecordId::new(connection.last_insert_rowid()),
        description: new_earning.description,
        amount: new_earning.amount,
        date: new_earning.date,
        recurrence: new_earning.recurrence,
    })
}

/// Retrieve all earnings in creation order.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn list_earnings(connection: &Connection) -> Result<Vec<Earning>, Error> {
    connection
        .prepare("SELECT id, description, amount, date, recurrence FROM earning;")?
        .query_map([], map_earning_row)?
        .map(|maybe_earning| maybe_earning.map_err(|error| error.into()))
        .collect()
}

/// Replace the non-identifier fields of an earning.
///
/// # Errors
/// Returns an [Error::NotFound] if the earning does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn replace_earning(earning: &Earning, connection: &Connection) -> Result<(), Error> {
    if earning.amount < 0.0 {
        return Err(Error::NegativeAmount(earning.amount));
    }

    let rows_affected = connection.execute(
        "UPDATE earning SET description = ?1, amount = ?2, date = ?3, recurrence = ?4
         WHERE id = ?5;",
        (
            &earning.description,
            earning.amount,
            earning.date,
            earning.recurrence,
            earning.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete an earning from the database.
///
/// # Errors
/// Returns an [Error::NotFound] if the earning does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn delete_earning(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM earning WHERE id = ?1;", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// A route handler that lists all earnings.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_earnings_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_earnings(&connection) {
        Ok(earnings) => ok_response(StatusCode::OK, earnings),
        Err(error) => error_response(error, "fetch earnings"),
    }
}

/// A route handler that creates an earning.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_earning_endpoint(
    State(state): State<AppState>,
    Json(new_earning): Json<NewEarning>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match create_earning(new_earning, &connection) {
        Ok(earning) => ok_response(StatusCode::CREATED, earning),
        Err(error) => error_response(error, "add earning"),
    }
}

/// A route handler that replaces an earning keyed by the id in the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_earning_endpoint(
    State(state): State<AppState>,
    Json(earning): Json<Earning>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match replace_earning(&earning, &connection) {
        Ok(()) => ok_response(StatusCode::OK, earning),
        Err(error) => error_response(error, "update earning"),
    }
}

/// A route handler that deletes the earning named by the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_earning_endpoint(
    State(state): State<AppState>,
    Json(body): Json<DeleteBody>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_earning(body.id, &connection) {
        Ok(()) => ok_empty_response(),
        Err(error) => error_response(error, "delete earning"),
    }
}
