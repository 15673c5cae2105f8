//! Database initialization for the persistence service.

use rusqlite::Connection;

use crate::{balance, budget, debt, earning, goal, lending, transaction};

/// Create the tables for all entity collections if they do not already exist.
///
/// # Errors
/// Returns an error if any table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    transaction::create_transaction_table(connection)?;
    balance::create_balance_table(connection)?;
    goal::create_goal_table(connection)?;
    debt::create_debt_table(connection)?;
    lending::create_lending_table(connection)?;
    earning::create_earning_table(connection)?;
    budget::create_budget_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn is_idempotent() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        initialize(&connection).unwrap();

        assert_eq!(Ok(()), initialize(&connection));
    }
}
