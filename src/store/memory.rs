use rust_decimal::Decimal;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::{sort_newest_first, BudgetFilter, RecordStore, RecordWriter, Seed, TransactionFilter};
use crate::error::{Error, Result};
use crate::models::{validate_contribution, Budget, Category, SavingsGoal, Transaction};

/// Mock backend: plain vectors behind one lock.
///
/// Every mutation holds the lock for its whole read-modify-write, which
/// serializes writers per store (and so per entity id).
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    goals: Vec<SavingsGoal>,
    categories: Vec<Category>,
}

const MOCK_DATA: &str = include_str!("../../data/seed.json");

/// Next id for a table: one past the largest assigned, starting at 1.
fn next_id(ids: impl Iterator<Item = Option<i64>>) -> i64 {
    ids.flatten().max().unwrap_or(0) + 1
}

impl MemoryStore {
    /// An empty store holding only the default categories.
    pub fn new() -> Self {
        Self::from_seed(Seed::default())
    }

    /// Load a mock data set. Records without an id get one; categories fall
    /// back to the defaults when the seed has none.
    pub fn from_seed(seed: Seed) -> Self {
        let mut tables = Tables {
            transactions: seed.transactions,
            budgets: seed.budgets,
            goals: seed.goals,
            categories: if seed.categories.is_empty() {
                Category::defaults()
            } else {
                seed.categories
            },
        };
        assign_missing_ids(&mut tables.transactions, |t| &mut t.id);
        assign_missing_ids(&mut tables.budgets, |b| &mut b.id);
        assign_missing_ids(&mut tables.goals, |g| &mut g.id);
        assign_missing_ids(&mut tables.categories, |c| &mut c.id);
        debug!(
            transactions = tables.transactions.len(),
            budgets = tables.budgets.len(),
            goals = tables.goals.len(),
            "memory store seeded"
        );
        Self {
            tables: Mutex::new(tables),
        }
    }

    pub fn from_seed_json(json: &str) -> Result<Self> {
        let seed: Seed = serde_json::from_str(json)?;
        for txn in &seed.transactions {
            txn.validate()?;
        }
        for budget in &seed.budgets {
            budget.validate()?;
        }
        for goal in &seed.goals {
            goal.validate()?;
        }
        Ok(Self::from_seed(seed))
    }

    /// The bundled demo data set.
    pub fn mock() -> Result<Self> {
        Self::from_seed_json(MOCK_DATA)
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn assign_missing_ids<T>(rows: &mut [T], id: impl Fn(&mut T) -> &mut Option<i64>) {
    let mut next = next_id(rows.iter_mut().map(|r| *id(r)));
    for row in rows.iter_mut() {
        let slot = id(row);
        if slot.is_none() {
            *slot = Some(next);
            next += 1;
        }
    }
}

fn position<T>(rows: &[T], id: i64, get: impl Fn(&T) -> Option<i64>) -> Option<usize> {
    rows.iter().position(|r| get(r) == Some(id))
}

impl RecordStore for MemoryStore {
    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut txns: Vec<Transaction> = self
            .lock()
            .transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_newest_first(&mut txns);
        debug!(?filter, count = txns.len(), "listed transactions");
        Ok(txns)
    }

    async fn list_budgets(&self, filter: &BudgetFilter) -> Result<Vec<Budget>> {
        let budgets: Vec<Budget> = self
            .lock()
            .budgets
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        debug!(?filter, count = budgets.len(), "listed budgets");
        Ok(budgets)
    }

    async fn list_goals(&self) -> Result<Vec<SavingsGoal>> {
        Ok(self.lock().goals.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, name: &str) -> Result<Option<Category>> {
        Ok(Category::find_by_name(&self.lock().categories, name).cloned())
    }
}

impl RecordWriter for MemoryStore {
    async fn create_transaction(&self, txn: &Transaction) -> Result<i64> {
        txn.validate()?;
        let mut tables = self.lock();
        let id = next_id(tables.transactions.iter().map(|t| t.id));
        let mut row = txn.clone();
        row.id = Some(id);
        tables.transactions.push(row);
        info!(id, amount = %txn.amount, kind = %txn.kind, "transaction created");
        Ok(id)
    }

    async fn update_transaction(&self, id: i64, txn: &Transaction) -> Result<Transaction> {
        txn.validate()?;
        let mut tables = self.lock();
        let idx = position(&tables.transactions, id, |t| t.id)
            .ok_or_else(|| Error::not_found("Transaction", id))?;
        let mut row = txn.clone();
        row.id = Some(id);
        row.created_at = tables.transactions[idx].created_at.clone();
        tables.transactions[idx] = row.clone();
        info!(id, "transaction updated");
        Ok(row)
    }

    async fn delete_transaction(&self, id: i64) -> Result<Transaction> {
        let mut tables = self.lock();
        let idx = position(&tables.transactions, id, |t| t.id)
            .ok_or_else(|| Error::not_found("Transaction", id))?;
        info!(id, "transaction deleted");
        Ok(tables.transactions.remove(idx))
    }

    async fn create_budget(&self, budget: &Budget) -> Result<i64> {
        budget.validate()?;
        let mut tables = self.lock();
        if tables
            .budgets
            .iter()
            .any(|b| b.category == budget.category && b.month == budget.month)
        {
            return Err(Error::invalid(format!(
                "A budget for {} in {} already exists",
                budget.category, budget.month
            )));
        }
        let id = next_id(tables.budgets.iter().map(|b| b.id));
        tables.budgets.push(Budget {
            id: Some(id),
            spent: Decimal::ZERO,
            rollover: Decimal::ZERO,
            ..budget.clone()
        });
        info!(id, category = %budget.category, month = %budget.month, "budget created");
        Ok(id)
    }

    async fn update_budget(&self, id: i64, budget: &Budget) -> Result<Budget> {
        budget.validate()?;
        let mut tables = self.lock();
        let idx = position(&tables.budgets, id, |b| b.id)
            .ok_or_else(|| Error::not_found("Budget", id))?;
        if tables.budgets.iter().any(|b| {
            b.id != Some(id) && b.category == budget.category && b.month == budget.month
        }) {
            return Err(Error::invalid(format!(
                "A budget for {} in {} already exists",
                budget.category, budget.month
            )));
        }
        let row = Budget {
            id: Some(id),
            ..budget.clone()
        };
        tables.budgets[idx] = row.clone();
        info!(id, "budget updated");
        Ok(row)
    }

    async fn delete_budget(&self, id: i64) -> Result<Budget> {
        let mut tables = self.lock();
        let idx = position(&tables.budgets, id, |b| b.id)
            .ok_or_else(|| Error::not_found("Budget", id))?;
        info!(id, "budget deleted");
        Ok(tables.budgets.remove(idx))
    }

    async fn create_goal(&self, goal: &SavingsGoal) -> Result<i64> {
        goal.validate_deadline(chrono::Local::now().date_naive())?;
        goal.validate()?;
        let mut tables = self.lock();
        let id = next_id(tables.goals.iter().map(|g| g.id));
        tables.goals.push(SavingsGoal {
            id: Some(id),
            current_amount: Decimal::ZERO,
            ..goal.clone()
        });
        info!(id, name = %goal.name, "goal created");
        Ok(id)
    }

    async fn update_goal(&self, id: i64, goal: &SavingsGoal) -> Result<SavingsGoal> {
        goal.validate()?;
        let mut tables = self.lock();
        let idx = position(&tables.goals, id, |g| g.id)
            .ok_or_else(|| Error::not_found("Savings goal", id))?;
        let stored = &tables.goals[idx];
        if goal.current_amount < stored.current_amount {
            return Err(Error::invalid("Saved amount cannot decrease"));
        }
        let row = SavingsGoal {
            id: Some(id),
            created_at: stored.created_at.clone(),
            ..goal.clone()
        };
        tables.goals[idx] = row.clone();
        info!(id, "goal updated");
        Ok(row)
    }

    async fn delete_goal(&self, id: i64) -> Result<SavingsGoal> {
        let mut tables = self.lock();
        let idx = position(&tables.goals, id, |g| g.id)
            .ok_or_else(|| Error::not_found("Savings goal", id))?;
        info!(id, "goal deleted");
        Ok(tables.goals.remove(idx))
    }

    async fn add_contribution(&self, goal_id: i64, amount: Decimal) -> Result<SavingsGoal> {
        validate_contribution(amount)?;
        let mut tables = self.lock();
        let goal = tables
            .goals
            .iter_mut()
            .find(|g| g.id == Some(goal_id))
            .ok_or_else(|| Error::not_found("Savings goal", goal_id))?;
        goal.current_amount = goal.with_contribution(amount)?;
        info!(goal_id, %amount, total = %goal.current_amount, "contribution added");
        Ok(goal.clone())
    }

    async fn create_category(&self, category: &Category) -> Result<i64> {
        if category.name.trim().is_empty() {
            return Err(Error::invalid("Category name is required"));
        }
        let mut tables = self.lock();
        if Category::find_by_name(&tables.categories, &category.name).is_some() {
            return Err(Error::invalid(format!(
                "Category '{}' already exists",
                category.name
            )));
        }
        let id = next_id(tables.categories.iter().map(|c| c.id));
        tables.categories.push(Category {
            id: Some(id),
            is_custom: true,
            ..category.clone()
        });
        info!(id, name = %category.name, "category created");
        Ok(id)
    }

    async fn delete_category(&self, id: i64) -> Result<Category> {
        let mut tables = self.lock();
        let idx = position(&tables.categories, id, |c| c.id)
            .filter(|&i| tables.categories[i].is_custom)
            .ok_or_else(|| Error::not_found("Custom category", id))?;
        info!(id, "category deleted");
        Ok(tables.categories.remove(idx))
    }
}

#[cfg(test)]
mod tests;
