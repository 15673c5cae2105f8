//! The budget collection.
//!
//! A budget is a named set of line items, one spending cap per category. The
//! line items are stored as a JSON column rather than a child table: budgets
//! are always read and replaced whole, never queried by line item.

use axum::{Json, extract::State, http::StatusCode, response::Response};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, RecordId,
    api::{DeleteBody, error_response, ok_empty_response, ok_response},
    session::Record,
};

/// One category's spending cap inside a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetExpense {
    /// The spending category, e.g. "Groceries".
    pub category: String,
    /// The monthly cap for that category.
    pub amount: f64,
}

/// A named collection of per-category spending caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The id assigned when the budget was created.
    pub id: RecordId,
    /// The budget's name, e.g. "June".
    pub name: String,
    /// The per-category caps. Never empty.
    pub expenses: Vec<BudgetExpense>,
}

/// A budget as submitted for creation, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    /// The budget's name.
    pub name: String,
    /// The per-category caps. Must not be empty.
    pub expenses: Vec<BudgetExpense>,
}

impl Budget {
    /// The total of all line items.
    pub fn total(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }
}

impl Record for Budget {
    const COLLECTION: &'static str = "budgets";

    type New = NewBudget;

    fn id(&self) -> RecordId {
        self.id
    }
}

pub(crate) fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            expenses TEXT NOT NULL
        );",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let expenses_json: String = row.get(2)?;
    let expenses = serde_json::from_str(&expenses_json).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })?;

    Ok(Budget {
        id: row.get(0)?,
        name: row.get(1)?,
        expenses,
    })
}

fn expenses_to_json(expenses: &[BudgetExpense]) -> Result<String, Error> {
    serde_json::to_string(expenses).map_err(|error| Error::JsonError(error.to_string()))
}

/// Create a budget in the database.
///
/// # Errors
/// Returns an [Error::EmptyBudget] if there are no line items, an
/// [Error::NegativeAmount] if any line item is negative, or an
/// [Error::SqlError] if there is an SQL error.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    validate_expenses(&new_budget.expenses)?;

    connection.execute(
        "INSERT INTO budget (name, expenses) VALUES (?1, ?2);",
        (&new_budget.name, expenses_to_json(&new_budget.expenses)?),
    )?;

    Ok(Budget {
        id: RecordId::new(connection.last_insert_rowid()),
        name: new_budget.name,
        expenses: new_budget.expenses,
    })
}

fn validate_expenses(expenses: &[BudgetExpense]) -> Result<(), Error> {
    if expenses.is_empty() {
        return Err(Error::EmptyBudget);
    }

    for expense in expenses {
        if expense.amount < 0.0 {
            return Err(Error::NegativeAmount(expense.amount));
        }
    }

    Ok(())
}

/// Retrieve all budgets in creation order.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn list_budgets(connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare("SELECT id, name, expenses FROM budget;")?
        .query_map([], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Replace the non-identifier fields of a budget.
///
/// # Errors
/// Returns an [Error::EmptyBudget] or [Error::NegativeAmount] for invalid line
/// items, an [Error::NotFound] if the budget does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn replace_budget(budget: &Budget, connection: &Connection) -> Result<(), Error> {
    validate_expenses(&budget.expenses)?;

    let rows_affected = connection.execute(
        "UPDATE budget SET name = ?1, expenses = ?2 WHERE id = ?3;",
        (&budget.name, expenses_to_json(&budget.expenses)?, budget.id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete a budget from the database.
///
/// # Errors
/// Returns an [Error::NotFound] if the budget does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn delete_budget(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = ?1;", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// A route handler that lists all budgets.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_budgets_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_budgets(&connection) {
        Ok(budgets) => ok_response(StatusCode::OK, budgets),
        Err(error) => error_response(error, "fetch budgets"),
    }
}

/// A route handler that creates a budget.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_budget_endpoint(
    State(state): State<AppState>,
    Json(new_budget): Json<NewBudget>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match create_budget(new_budget, &connection) {
        Ok(budget) => ok_response(StatusCode::CREATED, budget),
        Err(error) => error_response(error, "add budget"),
    }
}

/// A route handler that replaces a budget keyed by the id in the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_budget_endpoint(
    State(state): State<AppState>,
    Json(budget): Json<Budget>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match replace_budget(&budget, &connection) {
        Ok(()) => ok_response(StatusCode::OK, budget),
        Err(error) => error_response(error, "update budget"),
    }
}

/// A route handler that deletes the budget named by the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_budget_endpoint(
    State(state): State<AppState>,
    Json(body): Json<DeleteBody>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_budget(body.id, &connection) {
        Ok(()) => ok_empty_response(),
        Err(error) => error_response(error, "delete budget"),
    }
}

#[cfg(test)]
mod budget_tests {
    use rusqlite::Connection;

    use crate::{Error, initialize_db};

    use super::{BudgetExpense, NewBudget, create_budget, delete_budget, list_budgets,
        replace_budget};

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");
        connection
    }

    fn groceries_and_rent() -> Vec<BudgetExpense> {
        vec![
            BudgetExpense {
                category: "Groceries".to_owned(),
                amount: 400.0,
            },
            BudgetExpense {
                category: "Rent".to_owned(),
                amount: 1200.0,
            },
        ]
    }

    #[test]
    fn line_items_survive_the_json_column() {
        let connection = get_test_connection();

        let created = create_budget(
            NewBudget {
                name: "June".to_owned(),
                expenses: groceries_and_rent(),
            },
            &connection,
        )
        .unwrap();

        let listed = list_budgets(&connection).unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(listed[0].total(), 1600.0);
    }

    #[test]
    fn empty_budget_is_rejected() {
        let connection = get_test_connection();

        let result = create_budget(
            NewBudget {
                name: "June".to_owned(),
                expenses: vec![],
            },
            &connection,
        );

        assert_eq!(result, Err(Error::EmptyBudget));
    }

    #[test]
    fn replace_and_delete_missing_budget_is_not_found() {
        let connection = get_test_connection();
        let mut budget = create_budget(
            NewBudget {
                name: "June".to_owned(),
                expenses: groceries_and_rent(),
            },
            &connection,
        )
        .unwrap();
        delete_budget(budget.id, &connection).unwrap();

        budget.name = "July".to_owned();

        assert_eq!(replace_budget(&budget, &connection), Err(Error::NotFound));
        assert_eq!(delete_budget(budget.id, &connection), Err(Error::NotFound));
    }
}
