//! The savings goal collection.

use axum::{Json, extract::State, http::StatusCode, response::Response};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, RecordId,
    api::{DeleteBody, error_response, ok_empty_response, ok_response},
    session::Record,
};

/// A savings target the user is working towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    /// The id assigned when the goal was created.
    pub id: RecordId,
    /// What the user is saving for.
    pub name: String,
    /// How much has been put aside so far.
    pub current_amount: f64,
    /// The amount the user wants to reach.
    pub target_amount: f64,
    /// When the user wants to reach the target, if they set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Date>,
}

/// A savings goal as submitted for creation, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavingsGoal {
    /// What the user is saving for.
    pub name: String,
    /// How much has been put aside so far.
    pub current_amount: f64,
    /// The amount the user wants to reach.
    pub target_amount: f64,
    /// When the user wants to reach the target, if they set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Date>,
}

impl SavingsGoal {
    /// Progress towards the target as a percentage.
    ///
    /// Deliberately unclamped: saving past the target reports more than 100%.
    pub fn progress_percent(&self) -> f64 {
        self.current_amount / self.target_amount * 100.0
    }
}

impl Record for SavingsGoal {
    const COLLECTION: &'static str = "goals";

    type New = NewSavingsGoal;

    fn id(&self) -> RecordId {
        self.id
    }
}

pub(crate) fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            current_amount REAL NOT NULL,
            target_amount REAL NOT NULL,
            deadline TEXT
        );",
        (),
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<SavingsGoal, rusqlite::Error> {
    Ok(SavingsGoal {
        id: row.get(0)?,
        name: row.get(1)?,
        current_amount: row.get(2)?,
        target_amount: row.get(3)?,
        deadline: row.get(4)?,
    })
}

/// Create a savings goal in the database.
///
/// # Errors
/// Returns an [Error::NegativeAmount] if either amount is negative, or an
/// [Error::SqlError] if there is an SQL error.
pub fn create_goal(new_goal: NewSavingsGoal, connection: &Connection) -> Result<SavingsGoal, Error> {
    for amount in [new_goal.current_amount, new_goal.target_amount] {
        if amount < 0.0 {
            return Err(Error::NegativeAmount(amount));
        }
    }

    connection.execute(
        "INSERT INTO goal (name, current_amount, target_amount, deadline) VALUES (?1, ?2, ?3, ?4);",
        (
            &new_goal.name,
            new_goal.current_amount,
            new_goal.target_amount,
            new_goal.deadline,
        ),
    )?;

    Ok(SavingsGoal {
        id: RecordId::new(connection.last_insert_rowid()),
        name: new_goal.name,
        current_amount: new_goal.current_amount,
        target_amount: new_goal.target_amount,
        deadline: new_goal.deadline,
    })
}

/// Retrieve all savings goals in creation order.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn list_goals(connection: &Connection) -> Result<Vec<SavingsGoal>, Error> {
    connection
        .prepare("SELECT id, name, current_amount, target_amount, deadline FROM goal;")?
        .query_map([], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Replace the non-identifier fields of a savings goal.
///
/// # Errors
/// Returns an [Error::NotFound] if the goal does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn replace_goal(goal: &SavingsGoal, connection: &Connection) -> Result<(), Error> {
    for amount in [goal.current_amount, goal.target_amount] {
        if amount < 0.0 {
            return Err(Error::NegativeAmount(amount));
        }
    }

    let rows_affected = connection.execute(
        "UPDATE goal SET name = ?1, current_amount = ?2, target_amount = ?3, deadline = ?4
         WHERE id = ?5;",
        (
            &goal.name,
            goal.current_amount,
            goal.target_amount,
            goal.deadline,
            goal.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete a savings goal from the database.
///
/// # Errors
/// Returns an [Error::NotFound] if the goal does not exist, or an
/// [Error::SqlError] if there is an SQL error.
pub fn delete_goal(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM goal WHERE id = ?1;", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// A route handler that lists all savings goals.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_goals_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_goals(&connection) {
        Ok(goals) => ok_response(StatusCode::OK, goals),
        Err(error) => error_response(error, "fetch goals"),
    }
}

/// A route handler that creates a savings goal.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_goal_endpoint(
    State(state): State<AppState>,
    Json(new_goal): Json<NewSavingsGoal>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match create_goal(new_goal, &connection) {
        Ok(goal) => ok_response(StatusCode::CREATED, goal),
        Err(error) => error_response(error, "add goal"),
    }
}

/// A route handler that replaces a savings goal keyed by the id in the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_goal_endpoint(
    State(state): State<AppState>,
    Json(goal): Json<SavingsGoal>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match replace_goal(&goal, &connection) {
        Ok(()) => ok_response(StatusCode::OK, goal),
        Err(error) => error_response(error, "update goal"),
    }
}

/// A route handler that deletes the savings goal named by the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_goal_endpoint(
    State(state): State<AppState>,
    Json(body): Json<DeleteBody>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_goal(body.id, &connection) {
        Ok(()) => ok_empty_response(),
        Err(error) => error_response(error, "delete goal"),
    }
}

#[cfg(test)]
mod goal_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, RecordId, initialize_db};

    use super::{NewSavingsGoal, SavingsGoal, create_goal, delete_goal, list_goals, replace_goal};

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn progress_is_a_plain_ratio() {
        let mut goal = SavingsGoal {
            id: RecordId::new(1),
            name: "Emergency fund".to_owned(),
            current_amount: 300.0,
            target_amount: 1000.0,
            deadline: None,
        };
        assert_eq!(goal.progress_percent(), 30.0);

        goal.current_amount = 1000.0;
        assert_eq!(goal.progress_percent(), 100.0);
    }

    #[test]
    fn progress_is_not_clamped_past_target() {
        let goal = SavingsGoal {
            id: RecordId::new(1),
            name: "Holiday".to_owned(),
            current_amount: 1500.0,
            target_amount: 1000.0,
            deadline: None,
        };

        assert_eq!(goal.progress_percent(), 150.0);
    }

    #[test]
    fn create_list_replace_delete_round_trips() {
        let connection = get_test_connection();

        let mut goal = create_goal(
            NewSavingsGoal {
                name: "New laptop".to_owned(),
                current_amount: 200.0,
                target_amount: 1500.0,
                deadline: Some(date!(2025 - 12 - 31)),
            },
            &connection,
        )
        .unwrap();
        assert_eq!(list_goals(&connection).unwrap(), vec![goal.clone()]);

        goal.current_amount = 400.0;
        replace_goal(&goal, &connection).unwrap();
        assert_eq!(list_goals(&connection).unwrap()[0].current_amount, 400.0);

        delete_goal(goal.id, &connection).unwrap();
        assert_eq!(delete_goal(goal.id, &connection), Err(Error::NotFound));
        assert!(list_goals(&connection).unwrap().is_empty());
    }

    #[test]
    fn deadline_is_omitted_from_json_when_unset() {
        let goal = SavingsGoal {
            id: RecordId::new(1),
            name: "Holiday".to_owned(),
            current_amount: 0.0,
            target_amount: 100.0,
            deadline: None,
        };

        let json = serde_json::to_value(&goal).unwrap();

        assert!(json.get("deadline").is_none());
        assert_eq!(json["currentAmount"], 0.0);
        assert_eq!(json["targetAmount"], 100.0);
    }
}
