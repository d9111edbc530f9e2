use rust_decimal::Decimal;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::Database;
use crate::error::Result;
use crate::models::{Budget, Category, SavingsGoal, Transaction};
use crate::store::{BudgetFilter, RecordStore, RecordWriter, TransactionFilter};

/// Record store persisted in a local SQLite file.
///
/// One connection behind a lock; each call runs to completion before the
/// next one starts.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::open(path)?),
        })
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::open_in_memory()?),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for SqliteStore {
    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let txns = self.lock().get_transactions(filter)?;
        debug!(?filter, count = txns.len(), "listed transactions");
        Ok(txns)
    }

    async fn list_budgets(&self, filter: &BudgetFilter) -> Result<Vec<Budget>> {
        let budgets = self.lock().get_budgets(filter)?;
        debug!(?filter, count = budgets.len(), "listed budgets");
        Ok(budgets)
    }

    async fn list_goals(&self) -> Result<Vec<SavingsGoal>> {
        self.lock().get_goals()
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.lock().get_categories()
    }

    async fn get_category(&self, name: &str) -> Result<Option<Category>> {
        self.lock().get_category_by_name(name)
    }
}

impl RecordWriter for SqliteStore {
    async fn create_transaction(&self, txn: &Transaction) -> Result<i64> {
        let id = self.lock().insert_transaction(txn)?;
        info!(id, amount = %txn.amount, kind = %txn.kind, "transaction created");
        Ok(id)
    }

    async fn update_transaction(&self, id: i64, txn: &Transaction) -> Result<Transaction> {
        let row = self.lock().update_transaction(id, txn)?;
        info!(id, "transaction updated");
        Ok(row)
    }

    async fn delete_transaction(&self, id: i64) -> Result<Transaction> {
        let row = self.lock().delete_transaction(id)?;
        info!(id, "transaction deleted");
        Ok(row)
    }

    async fn create_budget(&self, budget: &Budget) -> Result<i64> {
        let id = self.lock().insert_budget(budget)?;
        info!(id, category = %budget.category, month = %budget.month, "budget created");
        Ok(id)
    }

    async fn update_budget(&self, id: i64, budget: &Budget) -> Result<Budget> {
        let row = self.lock().update_budget(id, budget)?;
        info!(id, "budget updated");
        Ok(row)
    }

    async fn delete_budget(&self, id: i64) -> Result<Budget> {
        let row = self.lock().delete_budget(id)?;
        info!(id, "budget deleted");
        Ok(row)
    }

    async fn create_goal(&self, goal: &SavingsGoal) -> Result<i64> {
        let id = self.lock().insert_goal(goal)?;
        info!(id, name = %goal.name, "goal created");
        Ok(id)
    }

    async fn update_goal(&self, id: i64, goal: &SavingsGoal) -> Result<SavingsGoal> {
        let row = self.lock().update_goal(id, goal)?;
        info!(id, "goal updated");
        Ok(row)
    }

    async fn delete_goal(&self, id: i64) -> Result<SavingsGoal> {
        let row = self.lock().delete_goal(id)?;
        info!(id, "goal deleted");
        Ok(row)
    }

    async fn add_contribution(&self, goal_id: i64, amount: Decimal) -> Result<SavingsGoal> {
        let goal = self.lock().add_contribution(goal_id, amount)?;
        info!(goal_id, %amount, total = %goal.current_amount, "contribution added");
        Ok(goal)
    }

    async fn create_category(&self, category: &Category) -> Result<i64> {
        let id = self.lock().insert_category(category)?;
        info!(id, name = %category.name, "category created");
        Ok(id)
    }

    async fn delete_category(&self, id: i64) -> Result<Category> {
        let row = self.lock().delete_category(id)?;
        info!(id, "category deleted");
        Ok(row)
    }
}
