//! Route handlers for the balance collection.

use axum::{Json, extract::State, http::StatusCode, response::Response};

use crate::{
    AppState,
    api::{DeleteBody, error_response, ok_empty_response, ok_response},
};

use super::{
    BalanceSnapshot, NewBalanceSnapshot, create_balance, delete_balance, list_balances,
    replace_balance,
};

/// A route handler that lists all balance snapshots, most recent first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_balances_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_balances(&connection) {
        Ok(balances) => ok_response(StatusCode::OK, balances),
        Err(error) => error_response(error, "fetch balances"),
    }
}

/// A route handler that records a new balance snapshot.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_balance_endpoint(
    State(state): State<AppState>,
    Json(new_balance): Json<NewBalanceSnapshot>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match create_balance(new_balance, &connection) {
        Ok(balance) => ok_response(StatusCode::CREATED, balance),
        Err(error) => error_response(error, "add balance"),
    }
}

/// A route handler that replaces a balance snapshot keyed by the id in the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn replace_balance_endpoint(
    State(state): State<AppState>,
    Json(balance): Json<BalanceSnapshot>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match replace_balance(&balance, &connection) {
        Ok(()) => ok_response(StatusCode::OK, balance),
        Err(error) => error_response(error, "update balance"),
    }
}

/// A route handler that deletes the balance snapshot named by the body.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_balance_endpoint(
    State(state): State<AppState>,
    Json(body): Json<DeleteBody>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_balance(body.id, &connection) {
        Ok(()) => ok_empty_response(),
        Err(error) => error_response(error, "delete balance"),
    }
}

#[cfg(test)]
mod balance_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, build_router};

    fn test_server() -> TestServer {
        let state = AppState::new(Connection::open_in_memory().unwrap(), None)
            .expect("Could not create app state");
        TestServer::try_new(build_router(state)).expect("Could not create test server")
    }

    #[tokio::test]
    async fn create_then_list_returns_snapshot() {
        let server = test_server();

        server
            .post("/api/balances")
            .json(&json!({
                "date": "2025-06-01",
                "bank": 1200.0,
                "upi": 300.0,
                "cash": 80.0
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let body: Value = server.get("/api/balances").await.json();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"][0]["bank"], json!(1200.0));
    }

    #[tokio::test]
    async fn replace_unknown_snapshot_returns_404() {
        let server = test_server();

        let response = server
            .put("/api/balances")
            .json(&json!({
                "id": "42",
                "date": "2025-06-01",
                "bank": 1200.0,
                "upi": 300.0,
                "cash": 80.0
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
