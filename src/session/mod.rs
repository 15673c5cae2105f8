//! The client-side session state store.
//!
//! A [Session] owns the in-memory copy of every entity collection for the
//! duration of a user session. Each mutation is synchronized with the remote
//! persistence service through a [RemoteStore]; only on success does the
//! in-memory collection advance, so a failed call leaves the previous state
//! intact. Transaction mutations additionally adjust the derived channel
//! balances (see [crate::balance::adjust]), and balance-snapshot mutations
//! rebase them onto whichever snapshot is latest afterwards.
//!
//! Mutations against one collection are serialized through that collection's
//! async lock, which is held across the network call: two in-flight mutations
//! on the same collection queue up rather than interleave, while mutations on
//! different collections proceed independently.

mod http;

use std::sync::{
    Mutex as StdMutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use tokio::sync::{Mutex, broadcast};

use crate::{
    RecordId,
    balance::{BalanceSnapshot, ChannelBalances, adjust, current_balances},
    budget::Budget,
    debt::Debt,
    earning::Earning,
    goal::SavingsGoal,
    lending::Lending,
    transaction::{NewTransaction, Transaction},
};

pub use http::HttpStore;

/// A stored record: identified, serializable, and belonging to a named
/// collection.
pub trait Record:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The collection path segment, e.g. "transactions".
    const COLLECTION: &'static str;

    /// The record as submitted for creation, without an id.
    type New: Serialize + Send + Sync;

    /// The id assigned at creation.
    fn id(&self) -> RecordId;
}

/// The errors that may occur while synchronizing with the remote store.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote endpoint could not be reached.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote endpoint reported a failure.
    #[error("{status}: {message}")]
    Server {
        /// The HTTP status of the failure response.
        status: reqwest::StatusCode,
        /// The error message from the response envelope.
        message: String,
    },

    /// The response did not match the expected envelope shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The session has been disposed and no longer accepts mutations.
    #[error("the session has been disposed")]
    Disposed,
}

impl SyncError {
    /// Whether this failure was a not-found report from the remote store.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SyncError::Server { status, .. } if *status == reqwest::StatusCode::NOT_FOUND
        )
    }
}

/// The capability the session needs from the remote persistence service: the
/// uniform list/create/replace/remove contract, per collection.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the full collection for `R`.
    async fn list<R: Record>(&self) -> Result<Vec<R>, SyncError>;

    /// Create a record from `draft`, returning it with its assigned id.
    async fn create<R: Record>(&self, draft: &R::New) -> Result<R, SyncError>;

    /// Replace the record with `record`'s id.
    async fn replace<R: Record>(&self, record: &R) -> Result<R, SyncError>;

    /// Remove the record with `id` from `R`'s collection.
    async fn remove<R: Record>(&self, id: RecordId) -> Result<(), SyncError>;
}

/// What a session mutation did, reported on the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// A record was added.
    Added,
    /// A record was replaced.
    Updated,
    /// A record was removed.
    Deleted,
}

/// A notification emitted for every mutation outcome, success or failure.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// The collection the mutation targeted.
    pub collection: &'static str,
    /// What the mutation did.
    pub action: SessionAction,
    /// `None` on success, the failure description otherwise.
    pub error: Option<String>,
}

struct Collection<R> {
    records: Mutex<Vec<R>>,
}

impl<R: Record> Collection<R> {
    fn new(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    async fn snapshot(&self) -> Vec<R> {
        self.records.lock().await.clone()
    }
}

/// The in-memory authority for all entity collections during a session.
///
/// Lifecycle: [Session::connect] loads every collection from the remote
/// store; the session then serves reads and mutations until
/// [Session::dispose], after which mutations fail with
/// [SyncError::Disposed].
pub struct Session<S> {
    store: S,
    disposed: AtomicBool,
    transactions: Collection<Transaction>,
    balances: Collection<BalanceSnapshot>,
    goals: Collection<SavingsGoal>,
    debts: Collection<Debt>,
    lending: Collection<Lending>,
    earnings: Collection<Earning>,
    budgets: Collection<Budget>,
    derived_balances: StdMutex<ChannelBalances>,
    events: broadcast::Sender<SessionEvent>,
}

impl<S: RemoteStore> Session<S> {
    /// Load every collection from the remote store and derive the current
    /// channel balances.
    ///
    /// # Errors
    /// Fails with the first [SyncError] encountered; a session is never
    /// created with partially loaded state.
    pub async fn connect(store: S) -> Result<Self, SyncError> {
        let transactions: Vec<Transaction> = store.list().await?;
        let balances: Vec<BalanceSnapshot> = store.list().await?;
        let goals = store.list().await?;
        let debts = store.list().await?;
        let lending = store.list().await?;
        let earnings = store.list().await?;
        let budgets = store.list().await?;

        let today = OffsetDateTime::now_utc().date();
        let derived = current_balances(balances.first(), &transactions, today);

        let (events, _) = broadcast::channel(64);

        Ok(Self {
            store,
            disposed: AtomicBool::new(false),
            transactions: Collection::new(transactions),
            balances: Collection::new(balances),
            goals: Collection::new(goals),
            debts: Collection::new(debts),
            lending: Collection::new(lending),
            earnings: Collection::new(earnings),
            budgets: Collection::new(budgets),
            derived_balances: StdMutex::new(derived),
            events,
        })
    }

    /// Stop accepting mutations. Reads continue to serve the last state.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    /// Subscribe to mutation outcome notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn ensure_active(&self) -> Result<(), SyncError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(SyncError::Disposed);
        }
        Ok(())
    }

    fn notify(&self, collection: &'static str, action: SessionAction, error: Option<&SyncError>) {
        match error {
            None => tracing::debug!("{action:?} succeeded on {collection}"),
            Some(error) => tracing::warn!("{action:?} failed on {collection}: {error}"),
        }

        // Nobody listening is fine.
        let _ = self.events.send(SessionEvent {
            collection,
            action,
            error: error.map(ToString::to_string),
        });
    }

    async fn add_in<R: Record>(
        &self,
        collection: &Collection<R>,
        draft: R::New,
    ) -> Result<R, SyncError> {
        self.ensure_active()?;
        let mut records = collection.records.lock().await;

        let result = self.store.create::<R>(&draft).await;
        self.notify(R::COLLECTION, SessionAction::Added, result.as_ref().err());

        let record = result?;
        records.insert(0, record.clone());
        Ok(record)
    }

    async fn update_in<R: Record>(
        &self,
        collection: &Collection<R>,
        record: R,
    ) -> Result<R, SyncError> {
        self.ensure_active()?;
        let mut records = collection.records.lock().await;

        let result = self.store.replace(&record).await;
        self.notify(R::COLLECTION, SessionAction::Updated, result.as_ref().err());

        let record = result?;
        if let Some(existing) = records.iter_mut().find(|existing| existing.id() == record.id()) {
            *existing = record.clone();
        }
        Ok(record)
    }

    async fn delete_in<R: Record>(
        &self,
        collection: &Collection<R>,
        record: &R,
    ) -> Result<(), SyncError> {
        self.ensure_active()?;
        let mut records = collection.records.lock().await;

        let result = self.store.remove::<R>(record.id()).await;
        self.notify(R::COLLECTION, SessionAction::Deleted, result.as_ref().err());

        result?;
        records.retain(|existing| existing.id() != record.id());
        Ok(())
    }

    fn adjust_derived(&self, transaction: &Transaction, factor: f64) {
        let mut balances = self.derived_balances.lock().unwrap();
        adjust(&mut balances, transaction, factor);
    }

    /// Recompute the derived balances from the latest snapshot on record.
    ///
    /// Local prepends can leave the snapshot list out of date order, so the
    /// latest snapshot is picked by date rather than position.
    fn rebase_derived(&self, snapshots: &[BalanceSnapshot], transactions: &[Transaction]) {
        let today = OffsetDateTime::now_utc().date();
        let latest = snapshots.iter().max_by_key(|snapshot| snapshot.date);
        let derived = current_balances(latest, transactions, today);
        *self.derived_balances.lock().unwrap() = derived;
    }

    /// The current in-memory transactions, most recent mutation first.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.transactions.snapshot().await
    }

    /// Create a transaction and apply its effect to the derived balances.
    pub async fn add_transaction(
        &self,
        draft: NewTransaction,
    ) -> Result<Transaction, SyncError> {
        self.ensure_active()?;
        let mut records = self.transactions.records.lock().await;

        let result = self.store.create::<Transaction>(&draft).await;
        self.notify(
            Transaction::COLLECTION,
            SessionAction::Added,
            result.as_ref().err(),
        );

        let transaction = result?;
        self.adjust_derived(&transaction, 1.0);
        records.insert(0, transaction.clone());
        Ok(transaction)
    }

    /// Replace a transaction: the original's effect on the derived balances is
    /// reverted and the replacement's applied.
    pub async fn update_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, SyncError> {
        self.ensure_active()?;
        let mut records = self.transactions.records.lock().await;

        let result = self.store.replace(&transaction).await;
        self.notify(
            Transaction::COLLECTION,
            SessionAction::Updated,
            result.as_ref().err(),
        );

        let transaction = result?;
        if let Some(existing) = records
            .iter_mut()
            .find(|existing| existing.id == transaction.id)
        {
            self.adjust_derived(existing, -1.0);
            self.adjust_derived(&transaction, 1.0);
            *existing = transaction.clone();
        }
        Ok(transaction)
    }

    /// Delete a transaction, reverting its effect on the derived balances.
    pub async fn delete_transaction(&self, transaction: &Transaction) -> Result<(), SyncError> {
        self.ensure_active()?;
        let mut records = self.transactions.records.lock().await;

        let result = self.store.remove::<Transaction>(transaction.id).await;
        self.notify(
            Transaction::COLLECTION,
            SessionAction::Deleted,
            result.as_ref().err(),
        );

        result?;
        if records.iter().any(|existing| existing.id == transaction.id) {
            self.adjust_derived(transaction, -1.0);
        }
        records.retain(|existing| existing.id != transaction.id);
        Ok(())
    }

    /// The derived bank/upi/cash balances, kept in step with every
    /// transaction mutation.
    pub fn balances_now(&self) -> ChannelBalances {
        *self.derived_balances.lock().unwrap()
    }

    /// The recorded balance snapshots, most recent first.
    pub async fn balance_snapshots(&self) -> Vec<BalanceSnapshot> {
        self.balances.snapshot().await
    }

    /// Record a new balance snapshot. If it becomes the latest snapshot, the
    /// derived balances are rebased onto it.
    pub async fn add_balance(
        &self,
        draft: <BalanceSnapshot as Record>::New,
    ) -> Result<BalanceSnapshot, SyncError> {
        self.ensure_active()?;
        let mut records = self.balances.records.lock().await;

        let result = self.store.create::<BalanceSnapshot>(&draft).await;
        self.notify(
            BalanceSnapshot::COLLECTION,
            SessionAction::Added,
            result.as_ref().err(),
        );

        let snapshot = result?;
        records.insert(0, snapshot.clone());
        let transactions = self.transactions.records.lock().await;
        self.rebase_derived(&records, &transactions);
        Ok(snapshot)
    }

    /// Replace a balance snapshot and rebase the derived balances.
    pub async fn update_balance(
        &self,
        snapshot: BalanceSnapshot,
    ) -> Result<BalanceSnapshot, SyncError> {
        self.ensure_active()?;
        let mut records = self.balances.records.lock().await;

        let result = self.store.replace(&snapshot).await;
        self.notify(
            BalanceSnapshot::COLLECTION,
            SessionAction::Updated,
            result.as_ref().err(),
        );

        let snapshot = result?;
        if let Some(existing) = records.iter_mut().find(|existing| existing.id == snapshot.id) {
            *existing = snapshot.clone();
        }
        let transactions = self.transactions.records.lock().await;
        self.rebase_derived(&records, &transactions);
        Ok(snapshot)
    }

    /// Delete a balance snapshot and rebase the derived balances onto
    /// whichever snapshot is latest afterwards.
    pub async fn delete_balance(&self, snapshot: &BalanceSnapshot) -> Result<(), SyncError> {
        self.ensure_active()?;
        let mut records = self.balances.records.lock().await;

        let result = self.store.remove::<BalanceSnapshot>(snapshot.id).await;
        self.notify(
            BalanceSnapshot::COLLECTION,
            SessionAction::Deleted,
            result.as_ref().err(),
        );

        result?;
        records.retain(|existing| existing.id != snapshot.id);
        let transactions = self.transactions.records.lock().await;
        self.rebase_derived(&records, &transactions);
        Ok(())
    }

    /// The current in-memory savings goals.
    pub async fn goals(&self) -> Vec<SavingsGoal> {
        self.goals.snapshot().await
    }

    /// Create a savings goal.
    pub async fn add_goal(
        &self,
        draft: <SavingsGoal as Record>::New,
    ) -> Result<SavingsGoal, SyncError> {
        self.add_in(&self.goals, draft).await
    }

    /// Replace a savings goal.
    pub async fn update_goal(&self, goal: SavingsGoal) -> Result<SavingsGoal, SyncError> {
        self.update_in(&self.goals, goal).await
    }

    /// Delete a savings goal.
    pub async fn delete_goal(&self, goal: &SavingsGoal) -> Result<(), SyncError> {
        self.delete_in(&self.goals, goal).await
    }

    /// The current in-memory debts.
    pub async fn debts(&self) -> Vec<Debt> {
        self.debts.snapshot().await
    }

    /// Create a debt.
    pub async fn add_debt(&self, draft: <Debt as Record>::New) -> Result<Debt, SyncError> {
        self.add_in(&self.debts, draft).await
    }

    /// Replace a debt.
    pub async fn update_debt(&self, debt: Debt) -> Result<Debt, SyncError> {
        self.update_in(&self.debts, debt).await
    }

    /// Delete a debt.
    pub async fn delete_debt(&self, debt: &Debt) -> Result<(), SyncError> {
        self.delete_in(&self.debts, debt).await
    }

    /// The current in-memory lending records.
    pub async fn lending(&self) -> Vec<Lending> {
        self.lending.snapshot().await
    }

    /// Create a lending record.
    pub async fn add_lending(&self, draft: <Lending as Record>::New) -> Result<Lending, SyncError> {
        self.add_in(&self.lending, draft).await
    }

    /// Replace a lending record.
    pub async fn update_lending(&self, lending: Lending) -> Result<Lending, SyncError> {
        self.update_in(&self.lending, lending).await
    }

    /// Delete a lending record.
    pub async fn delete_lending(&self, lending: &Lending) -> Result<(), SyncError> {
        self.delete_in(&self.lending, lending).await
    }

    /// The current in-memory earnings.
    pub async fn earnings(&self) -> Vec<Earning> {
        self.earnings.snapshot().await
    }

    /// Create an earning.
    pub async fn add_earning(&self, draft: <Earning as Record>::New) -> Result<Earning, SyncError> {
        self.add_in(&self.earnings, draft).await
    }

    /// Replace an earning.
    pub async fn update_earning(&self, earning: Earning) -> Result<Earning, SyncError> {
        self.update_in(&self.earnings, earning).await
    }

    /// Delete an earning.
    pub async fn delete_earning(&self, earning: &Earning) -> Result<(), SyncError> {
        self.delete_in(&self.earnings, earning).await
    }

    /// The current in-memory budgets.
    pub async fn budgets(&self) -> Vec<Budget> {
        self.budgets.snapshot().await
    }

    /// Create a budget.
    pub async fn add_budget(&self, draft: <Budget as Record>::New) -> Result<Budget, SyncError> {
        self.add_in(&self.budgets, draft).await
    }

    /// Replace a budget.
    pub async fn update_budget(&self, budget: Budget) -> Result<Budget, SyncError> {
        self.update_in(&self.budgets, budget).await
    }

    /// Delete a budget.
    pub async fn delete_budget(&self, budget: &Budget) -> Result<(), SyncError> {
        self.delete_in(&self.budgets, budget).await
    }
}
