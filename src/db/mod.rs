//! SQLite record table backend.

mod schema;
mod store;

pub use store::SqliteStore;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{
    add_contribution_to, validate_contribution, Budget, Category, Priority, SavingsGoal,
    Transaction, TransactionType,
};
use crate::store::{BudgetFilter, TransactionFilter};

pub(crate) struct Database {
    conn: Connection,
}

// ── Column decoding ───────────────────────────────────────────

fn bad_column(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn decimal_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw).map_err(|e| bad_column(idx, format!("amount '{raw}': {e}")))
}

fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| bad_column(idx, format!("date '{raw}': {e}")))
}

fn parsed_col<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl Fn(&str) -> Result<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).map_err(|e| bad_column(idx, e.to_string()))
}

const TRANSACTION_COLUMNS: &str =
    "id, amount, date, category, kind, description, notes, created_at";

fn transaction_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: Some(row.get(0)?),
        amount: decimal_col(row, 1)?,
        date: date_col(row, 2)?,
        category: row.get(3)?,
        kind: parsed_col(row, 4, TransactionType::parse)?,
        description: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const BUDGET_COLUMNS: &str = "id, category, month, monthly_limit, spent, rollover";

fn budget_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: Some(row.get(0)?),
        category: row.get(1)?,
        month: parsed_col(row, 2, |s: &str| s.parse())?,
        monthly_limit: decimal_col(row, 3)?,
        spent: decimal_col(row, 4)?,
        rollover: decimal_col(row, 5)?,
    })
}

const GOAL_COLUMNS: &str =
    "id, name, target_amount, current_amount, deadline, priority, created_at";

fn goal_row(row: &Row<'_>) -> rusqlite::Result<SavingsGoal> {
    Ok(SavingsGoal {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        target_amount: decimal_col(row, 2)?,
        current_amount: decimal_col(row, 3)?,
        deadline: date_col(row, 4)?,
        priority: parsed_col(row, 5, Priority::parse)?,
        created_at: row.get(6)?,
    })
}

fn category_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
        is_custom: row.get(4)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        info!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            debug!(version = schema::CURRENT_VERSION, "schema created");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for cat in Category::defaults() {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name, color, icon, is_custom) VALUES (?1, ?2, ?3, 0)",
                params![cat.name, cat.color, cat.icon],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        txn.validate()?;
        self.conn.execute(
            "INSERT INTO transactions (amount, date, category, kind, description, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                txn.amount.to_string(),
                txn.date.to_string(),
                txn.category,
                txn.kind.as_str(),
                txn.description,
                txn.notes,
                txn.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(id) = filter.id {
            sql.push_str(&format!(" AND id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(id));
        }
        if let Some(c) = &filter.category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(c.clone()));
        }
        if let Some(m) = filter.month {
            sql.push_str(&format!(" AND substr(date, 1, 7) = ?{}", param_values.len() + 1));
            param_values.push(Box::new(m.to_string()));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), transaction_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn update_transaction(&self, id: i64, txn: &Transaction) -> Result<Transaction> {
        txn.validate()?;
        let changed = self.conn.execute(
            "UPDATE transactions SET amount = ?1, date = ?2, category = ?3, kind = ?4,
                    description = ?5, notes = ?6
             WHERE id = ?7",
            params![
                txn.amount.to_string(),
                txn.date.to_string(),
                txn.category,
                txn.kind.as_str(),
                txn.description,
                txn.notes,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::not_found("Transaction", id));
        }
        self.get_transactions(&TransactionFilter::id(id))?
            .pop()
            .ok_or_else(|| Error::not_found("Transaction", id))
    }

    pub(crate) fn delete_transaction(&self, id: i64) -> Result<Transaction> {
        let existing = self
            .get_transactions(&TransactionFilter::id(id))?
            .pop()
            .ok_or_else(|| Error::not_found("Transaction", id))?;
        self.conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        Ok(existing)
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, icon, is_custom FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], category_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, color, icon, is_custom FROM categories WHERE name = ?1",
                params![name],
                category_row,
            )
            .optional()?)
    }

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        if cat.name.trim().is_empty() {
            return Err(Error::invalid("Category name is required"));
        }
        let result = self.conn.execute(
            "INSERT INTO categories (name, color, icon, is_custom) VALUES (?1, ?2, ?3, 1)",
            params![cat.name, cat.color, cat.icon],
        );
        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(Error::invalid(format!(
                "Category '{}' already exists",
                cat.name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn delete_category(&self, id: i64) -> Result<Category> {
        let existing = self
            .conn
            .query_row(
                "SELECT id, name, color, icon, is_custom FROM categories WHERE id = ?1 AND is_custom = 1",
                params![id],
                category_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("Custom category", id))?;
        self.conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(existing)
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn get_budgets(&self, filter: &BudgetFilter) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets
             WHERE (?1 IS NULL OR month = ?1) AND (?2 IS NULL OR id = ?2)
             ORDER BY month, category"
        ))?;
        let month = filter.month.map(|m| m.to_string());
        let rows = stmt.query_map(params![month, filter.id], budget_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_budget(&self, budget: &Budget) -> Result<i64> {
        budget.validate()?;
        let result = self.conn.execute(
            "INSERT INTO budgets (category, month, monthly_limit, spent, rollover)
             VALUES (?1, ?2, ?3, '0', '0')",
            params![
                budget.category,
                budget.month.to_string(),
                budget.monthly_limit.to_string(),
            ],
        );
        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(Error::invalid(format!(
                "A budget for {} in {} already exists",
                budget.category, budget.month
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn update_budget(&self, id: i64, budget: &Budget) -> Result<Budget> {
        budget.validate()?;
        let result = self.conn.execute(
            "UPDATE budgets SET category = ?1, month = ?2, monthly_limit = ?3, spent = ?4, rollover = ?5
             WHERE id = ?6",
            params![
                budget.category,
                budget.month.to_string(),
                budget.monthly_limit.to_string(),
                budget.spent.to_string(),
                budget.rollover.to_string(),
                id,
            ],
        );
        match result {
            Ok(0) => Err(Error::not_found("Budget", id)),
            Ok(_) => self
                .get_budgets(&BudgetFilter::id(id))?
                .pop()
                .ok_or_else(|| Error::not_found("Budget", id)),
            Err(e) if is_unique_violation(&e) => Err(Error::invalid(format!(
                "A budget for {} in {} already exists",
                budget.category, budget.month
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn delete_budget(&self, id: i64) -> Result<Budget> {
        let existing = self
            .get_budgets(&BudgetFilter::id(id))?
            .pop()
            .ok_or_else(|| Error::not_found("Budget", id))?;
        self.conn
            .execute("DELETE FROM budgets WHERE id = ?1", params![id])?;
        Ok(existing)
    }

    // ── Goals ─────────────────────────────────────────────────

    pub(crate) fn get_goals(&self) -> Result<Vec<SavingsGoal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {GOAL_COLUMNS} FROM goals ORDER BY id"))?;
        let rows = stmt.query_map([], goal_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn get_goal(&self, id: i64) -> Result<SavingsGoal> {
        self.conn
            .query_row(
                &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"),
                params![id],
                goal_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("Savings goal", id))
    }

    pub(crate) fn insert_goal(&self, goal: &SavingsGoal) -> Result<i64> {
        goal.validate_deadline(chrono::Local::now().date_naive())?;
        goal.validate()?;
        self.conn.execute(
            "INSERT INTO goals (name, target_amount, current_amount, deadline, priority, created_at)
             VALUES (?1, ?2, '0', ?3, ?4, ?5)",
            params![
                goal.name,
                goal.target_amount.to_string(),
                goal.deadline.to_string(),
                goal.priority.as_str(),
                goal.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_goal(&mut self, id: i64, goal: &SavingsGoal) -> Result<SavingsGoal> {
        goal.validate()?;
        let tx = self.conn.transaction()?;
        let stored = tx
            .query_row(
                "SELECT current_amount FROM goals WHERE id = ?1",
                params![id],
                |row| decimal_col(row, 0),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("Savings goal", id))?;
        if goal.current_amount < stored {
            return Err(Error::invalid("Saved amount cannot decrease"));
        }
        tx.execute(
            "UPDATE goals SET name = ?1, target_amount = ?2, current_amount = ?3, deadline = ?4, priority = ?5
             WHERE id = ?6",
            params![
                goal.name,
                goal.target_amount.to_string(),
                goal.current_amount.to_string(),
                goal.deadline.to_string(),
                goal.priority.as_str(),
                id,
            ],
        )?;
        tx.commit()?;
        self.get_goal(id)
    }

    pub(crate) fn delete_goal(&self, id: i64) -> Result<SavingsGoal> {
        let existing = self.get_goal(id)?;
        self.conn
            .execute("DELETE FROM goals WHERE id = ?1", params![id])?;
        Ok(existing)
    }

    /// Read-modify-write of `current_amount` inside one SQLite transaction.
    pub(crate) fn add_contribution(&mut self, id: i64, amount: Decimal) -> Result<SavingsGoal> {
        validate_contribution(amount)?;
        let tx = self.conn.transaction()?;
        let current = tx
            .query_row(
                "SELECT current_amount FROM goals WHERE id = ?1",
                params![id],
                |row| decimal_col(row, 0),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("Savings goal", id))?;
        let total = add_contribution_to(current, amount)?;
        tx.execute(
            "UPDATE goals SET current_amount = ?1 WHERE id = ?2",
            params![total.to_string(), id],
        )?;
        tx.commit()?;
        self.get_goal(id)
    }
}

#[cfg(test)]
mod tests;
