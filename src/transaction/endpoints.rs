//! Route handlers for the transaction collection.

use axum::{Json, extract::State, http::StatusCode, response::Response};

use crate::{
    AppState,
    api::{DeleteBody, error_response, ok_empty_response, ok_response},
};

use super::{
    NewTransaction, Transaction, create_transaction, delete_transaction, list_transactions,
    replace_transaction,
};

/// A route handler that lists all transactions, most recent first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_transactions_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_transactions(&connection) {
        Ok(transactions) => ok_response(StatusCode::OK, transactions),
        Err(error) => error_response(error, "fetch transactions"),
    }
}

/// A route handler that creates a transaction and responds with the stored
/// record, id included.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Json(new_transaction): Json<NewTransaction>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match create_transaction(new_transaction, &connection) {
        Ok(transaction) => ok_response(StatusCode::CREATED, transaction),
        Err(error) => error_response(error, "add transaction"),
    }
}

/// A route handler that replaces a transaction keyed by the id in the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_transaction_endpoint(
    State(state): State<AppState>,
    Json(transaction): Json<Transaction>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match replace_transaction(&transaction, &connection) {
        Ok(()) => ok_response(StatusCode::OK, transaction),
        Err(error) => error_response(error, "update transaction"),
    }
}

/// A route handler that deletes the transaction named by the body `{"id": ...}`.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Json(body): Json<DeleteBody>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_transaction(body.id, &connection) {
        Ok(()) => ok_empty_response(),
        Err(error) => error_response(error, "delete transaction"),
    }
}
