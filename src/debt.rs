//! The debt collection.

use axum::{Json, extract::State, http::StatusCode, response::Response};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, RecordId,
    api::{DeleteBody, error_response, ok_empty_response, ok_response},
    session::Record,
};

/// Money the user owes, e.g. a loan or a credit card balance.
///
/// The current balance is conceptually no more than the initial amount, but
/// this is not enforced: interest can push a balance past the principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    /// The id assigned when the debt was created.
    pub id: RecordId,
    /// What the debt is, e.g. "Car loan".
    pub name: String,
    /// The amount originally borrowed.
    pub initial_amount: f64,
    /// The amount still owed.
    pub current_balance: f64,
    /// Annual interest rate as a percentage, e.g. 4.5.
    pub interest_rate: f64,
}

/// A debt as submitted for creation, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDebt {
    /// What the debt is.
    pub name: String,
    /// The amount originally borrowed.
    pub initial_amount: f64,
    /// The amount still owed.
    pub current_balance: f64,
    /// Annual interest rate as a percentage.
    pub interest_rate: f64,
}

impl Record for Debt {
    const COLLECTION: &'static str = "debts";

    type New = NewDebt;

    fn id(&self) -> RecordId {
        self.id
    }
}

pub(crate) fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS debt (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            initial_amount REAL NOT NULL,
            current_balance REAL NOT NULL,
            interest_rate REAL NOT NULL
        );",
        (),
    )?;

    Ok(())
}

fn map_debt_row(row: &Row) -> Result<Debt, rusqlite::Error> {
    Ok(Debt {
        id: row.get(0)?,
        name: row.get(1)?,
        initial_amount: row.get(2)?,
        current_balance: row.get(3)?,
        interest_rate: row.get(4)?,
    })
}

/// Create a debt in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn create_debt(new_debt: NewDebt, connection: &Connection) -> Result<Debt, Error> {
    connection.execute(
        "INSERT INTO debt (name, initial_amount, current_balance, interest_rate)
         VALUES (?1, ?2, ?3, ?4);",
        (
            &new_debt.name,
            new_debt.initial_amount,
            new_debt.current_balance,
            new_debt.interest_rate,
        ),
    )?;

    Ok(Debt {
        id: RecordId::new(connection.last_insert_rowid()),
        name: new_debt.name,
        initial_amount: new_debt.initial_amount,
        current_balance: new_debt.current_balance,
        interest_rate: new_debt.interest_rate,
    })
}

/// Retrieve all debts in creation order.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn list_debts(connection: &Connection) -> Result<Vec<Debt>, Error> {
    connection
        .prepare("SELECT id, name, initial_amount, current_balance, interest_rate FROM debt;")?
        .query_map([], map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(|error| error.into()))
        .collect()
}

/// Replace the non-identifier fields of a debt.
///
/// # Errors
/// Returns an [Error::NotFound] if the debt does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn replace_debt(debt: &Debt, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE debt SET name = ?1, initial_amount = ?2, current_balance = ?3, interest_rate = ?4
         WHERE id = ?5;",
        (
            &debt.name,
            debt.initial_amount,
            debt.current_balance,
            debt.interest_rate,
            debt.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete a debt from the database.
///
/// # Errors
/// Returns an [Error::NotFound] if the debt does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn delete_debt(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM debt WHERE id = ?1;", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// A route handler that lists all debts.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_debts_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_debts(&connection) {
        Ok(debts) => ok_response(StatusCode::OK, debts),
        Err(error) => error_response(error, "fetch debts"),
    }
}

/// A route handler that creates a debt.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_debt_endpoint(
    State(state): State<AppState>,
    Json(new_debt): Json<NewDebt>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match create_debt(new_debt, &connection) {
        Ok(debt) => ok_response(StatusCode::CREATED, debt),
        Err(error) => error_response(error, "add debt"),
    }
}

/// A route handler that replaces a debt keyed by the id in the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_debt_endpoint(
    State(state): State<AppState>,
    Json(debt): Json<Debt>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match replace_debt(&debt, &connection) {
        Ok(()) => ok_response(StatusCode::OK, debt),
        Err(error) => error_response(error, "update debt"),
    }
}

/// A route handler that deletes the debt named by the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_debt_endpoint(
    State(state): State<AppState>,
    Json(body): Json<DeleteBody>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_debt(body.id, &connection) {
        Ok(()) => ok_empty_response(),
        Err(error) => error_response(error, "delete debt"),
    }
}

#[cfg(test)]
mod debt_tests {
    use rusqlite::Connection;

    use crate::{Error, initialize_db};

    use super::{NewDebt, create_debt, delete_debt, list_debts, replace_debt};

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_list_replace_delete_round_trips() {
        let connection = get_test_connection();

        let mut debt = create_debt(
            NewDebt {
                name: "Car loan".to_owned(),
                initial_amount: 8000.0,
                current_balance: 6500.0,
                interest_rate: 4.5,
            },
            &connection,
        )
        .unwrap();
        assert_eq!(list_debts(&connection).unwrap(), vec![debt.clone()]);

        debt.current_balance = 6000.0;
        replace_debt(&debt, &connection).unwrap();
        assert_eq!(list_debts(&connection).unwrap()[0].current_balance, 6000.0);

        delete_debt(debt.id, &connection).unwrap();
        assert_eq!(delete_debt(debt.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let connection = get_test_connection();
        let debt = create_debt(
            NewDebt {
                name: "Car loan".to_owned(),
                initial_amount: 8000.0,
                current_balance: 6500.0,
                interest_rate: 4.5,
            },
            &connection,
        )
        .unwrap();

        let json = serde_json::to_value(&debt).unwrap();

        assert_eq!(json["initialAmount"], 8000.0);
        assert_eq!(json["currentBalance"], 6500.0);
        assert_eq!(json["interestRate"], 4.5);
    }
}
