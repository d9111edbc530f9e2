//! Record store contract and the in-memory backend.
//!
//! Stores are read through [`RecordStore`] and changed through
//! [`RecordWriter`]. Implementations serialize mutations, so a reader never
//! sees a half-applied contribution or update.

mod memory;

pub use memory::MemoryStore;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Budget, Category, SavingsGoal, Transaction};
use crate::month::MonthKey;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub month: Option<MonthKey>,
    pub category: Option<String>,
    pub id: Option<i64>,
}

impl TransactionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn month(month: MonthKey) -> Self {
        Self {
            month: Some(month),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        self.month.map_or(true, |m| txn.month() == m)
            && self.category.as_ref().map_or(true, |c| &txn.category == c)
            && self.id.map_or(true, |id| txn.id == Some(id))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetFilter {
    pub month: Option<MonthKey>,
    pub id: Option<i64>,
}

impl BudgetFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn month(month: MonthKey) -> Self {
        Self {
            month: Some(month),
            id: None,
        }
    }

    pub fn id(id: i64) -> Self {
        Self {
            month: None,
            id: Some(id),
        }
    }

    pub fn matches(&self, budget: &Budget) -> bool {
        self.month.map_or(true, |m| budget.month == m)
            && self.id.map_or(true, |id| budget.id == Some(id))
    }
}

/// Read side of a store.
///
/// `list_transactions` returns newest first (date, then id, descending).
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;
    async fn list_budgets(&self, filter: &BudgetFilter) -> Result<Vec<Budget>>;
    async fn list_goals(&self) -> Result<Vec<SavingsGoal>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn get_category(&self, name: &str) -> Result<Option<Category>>;
}

/// Write side of a store. Ids are assigned by the store and returned on create.
#[allow(async_fn_in_trait)]
pub trait RecordWriter {
    async fn create_transaction(&self, txn: &Transaction) -> Result<i64>;
    async fn update_transaction(&self, id: i64, txn: &Transaction) -> Result<Transaction>;
    async fn delete_transaction(&self, id: i64) -> Result<Transaction>;

    /// Fails if a budget for the same (category, month) exists.
    async fn create_budget(&self, budget: &Budget) -> Result<i64>;
    async fn update_budget(&self, id: i64, budget: &Budget) -> Result<Budget>;
    async fn delete_budget(&self, id: i64) -> Result<Budget>;

    async fn create_goal(&self, goal: &SavingsGoal) -> Result<i64>;
    /// Cannot lower `current_amount`; use contributions to raise it.
    async fn update_goal(&self, id: i64, goal: &SavingsGoal) -> Result<SavingsGoal>;
    async fn delete_goal(&self, id: i64) -> Result<SavingsGoal>;
    async fn add_contribution(&self, goal_id: i64, amount: Decimal) -> Result<SavingsGoal>;

    async fn create_category(&self, category: &Category) -> Result<i64>;
    /// Only custom categories can be deleted.
    async fn delete_category(&self, id: i64) -> Result<Category>;
}

/// Mock data set, as loaded by [`MemoryStore::from_seed_json`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<SavingsGoal>,
}

/// Newest first, as every store returns transactions.
pub(crate) fn sort_newest_first(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}
