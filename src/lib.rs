//! FinanceFlow is a personal finance tracker: transactions, balances, savings
//! goals, debts, lending records, earnings, and budgets.
//!
//! This library provides three pieces:
//!
//! - an HTTP persistence service serving a uniform JSON CRUD contract per
//!   entity collection ([build_router]),
//! - a client-side session state store ([session::Session]) that keeps
//!   in-memory collections consistent with the service and derives the current
//!   channel balances from transaction history,
//! - AI advisor flows ([ai]) for budget suggestions and chart recommendations.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod api;
mod app_state;
mod db;
mod endpoints;
mod record_id;
mod routing;
mod summary;

pub mod ai;
pub mod balance;
pub mod budget;
pub mod debt;
pub mod earning;
pub mod goal;
pub mod lending;
pub mod session;
pub mod transaction;

pub use api::ApiResponse;
pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use record_id::RecordId;
pub use routing::build_router;
pub use summary::{
    monthly_recurring_earnings, sum_by_category, total_debt_outstanding, total_lent_pending,
    total_with,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the persistence service.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested record was not found.
    ///
    /// Clients should check that the id is correct and that the record has not
    /// already been deleted.
    #[error("the requested record could not be found")]
    NotFound,

    /// A negative amount was used to create or replace a record.
    ///
    /// Amounts are stored as non-negative magnitudes; the sign is derived from
    /// the transaction kind at use sites.
    #[error("{0} is negative, amounts must be non-negative")]
    NegativeAmount(f64),

    /// A budget was created or replaced with no line items.
    #[error("a budget must have at least one line item")]
    EmptyBudget,

    /// A stored value could not be serialized to or parsed from JSON.
    #[error("could not convert value to or from JSON: {0}")]
    JsonError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
