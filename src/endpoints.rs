//! The API endpoint URIs.

/// The route to access transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access balance snapshots.
pub const BALANCES: &str = "/api/balances";
/// The route to access savings goals.
pub const GOALS: &str = "/api/goals";
/// The route to access debts.
pub const DEBTS: &str = "/api/debts";
/// The route to access lending records.
pub const LENDING: &str = "/api/lending";
/// The route to access earnings.
pub const EARNINGS: &str = "/api/earnings";
/// The route to access budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route for AI budget suggestions.
pub const AI_BUDGET: &str = "/api/ai/budget";
/// The route for AI chart-type recommendations.
pub const AI_CHART: &str = "/api/ai/chart";
