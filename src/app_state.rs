//! Implements a struct that holds the state of the persistence service.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, ai::TextModel, db::initialize};

/// The state of the persistence service.
#[derive(Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The generative-text model backing the AI advisor endpoints, if one is
    /// configured.
    pub advisor: Option<Arc<dyn TextModel>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the
    /// entity collections. Pass `None` for `advisor` to serve the collections
    /// without the AI endpoints being available.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        advisor: Option<Arc<dyn TextModel>>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            advisor,
        })
    }
}
