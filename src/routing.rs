//! Application router configuration for the collection and AI endpoints.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    ai::{suggest_budget_endpoint, suggest_chart_endpoint},
    balance::{
        create_balance_endpoint, delete_balance_endpoint, list_balances_endpoint,
        replace_balance_endpoint,
    },
    budget::{
        create_budget_endpoint, delete_budget_endpoint, list_budgets_endpoint,
        replace_budget_endpoint,
    },
    debt::{
        create_debt_endpoint, delete_debt_endpoint, list_debts_endpoint, replace_debt_endpoint,
    },
    earning::{
        create_earning_endpoint, delete_earning_endpoint, list_earnings_endpoint,
        replace_earning_endpoint,
    },
    endpoints,
    goal::{
        create_goal_endpoint, delete_goal_endpoint, list_goals_endpoint, replace_goal_endpoint,
    },
    lending::{
        create_lending_endpoint, delete_lending_endpoint, list_lending_endpoint,
        replace_lending_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
        replace_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every collection route follows the same contract: GET lists, POST creates,
/// PUT replaces by the id in the body, DELETE removes by the id in the body.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint)
                .post(create_transaction_endpoint)
                .put(replace_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BALANCES,
            get(list_balances_endpoint)
                .post(create_balance_endpoint)
                .put(replace_balance_endpoint)
                .delete(delete_balance_endpoint),
        )
        .route(
            endpoints::GOALS,
            get(list_goals_endpoint)
                .post(create_goal_endpoint)
                .put(replace_goal_endpoint)
                .delete(delete_goal_endpoint),
        )
        .route(
            endpoints::DEBTS,
            get(list_debts_endpoint)
                .post(create_debt_endpoint)
                .put(replace_debt_endpoint)
                .delete(delete_debt_endpoint),
        )
        .route(
            endpoints::LENDING,
            get(list_lending_endpoint)
                .post(create_lending_endpoint)
                .put(replace_lending_endpoint)
                .delete(delete_lending_endpoint),
        )
        .route(
            endpoints::EARNINGS,
            get(list_earnings_endpoint)
                .post(create_earning_endpoint)
                .put(replace_earning_endpoint)
                .delete(delete_earning_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(list_budgets_endpoint)
                .post(create_budget_endpoint)
                .put(replace_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(endpoints::AI_BUDGET, post(suggest_budget_endpoint))
        .route(endpoints::AI_CHART, post(suggest_chart_endpoint))
        .with_state(state)
}
