//! Page-level views: fetch from a store, then run the aggregations.
//!
//! Independent reads are issued together; the aggregation step only starts
//! once every read has returned.

use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

use crate::aggregate::{
    budget_usage, compute_budget_summary, compute_category_breakdown, compute_goals_summary,
    compute_income_expense_trend, compute_month_totals, compute_running_balance, goal_progress,
    refresh_budget_spent, sort_breakdown_descending, sort_chronological, sort_goals_by_priority,
    BalancedTransaction, BudgetSummary, BudgetUsage, CategoryAmount, GoalProgress, GoalsSummary,
    MonthTotals, TrendPoint,
};
use crate::error::Result;
use crate::models::{Budget, SavingsGoal, Transaction};
use crate::month::MonthKey;
use crate::present::budget_health;
use crate::store::{BudgetFilter, RecordStore, TransactionFilter};

const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub month: MonthKey,
    pub totals: MonthTotals,
    pub budget: BudgetSummary,
    pub health: Decimal,
    pub goals: GoalsSummary,
    /// Newest first.
    pub recent: Vec<Transaction>,
}

#[derive(Debug, Clone)]
pub struct TransactionsView {
    pub month: MonthKey,
    pub totals: MonthTotals,
    /// Oldest first, the order the running balance is folded in.
    pub transactions: Vec<Transaction>,
}

impl TransactionsView {
    pub fn rows(&self) -> Vec<BalancedTransaction<'_>> {
        compute_running_balance(&self.transactions)
    }
}

#[derive(Debug, Clone)]
pub struct BudgetsView {
    pub month: MonthKey,
    pub budgets: Vec<(Budget, BudgetUsage)>,
    pub summary: BudgetSummary,
}

#[derive(Debug, Clone)]
pub struct ChartsView {
    pub month: MonthKey,
    /// Largest category first.
    pub breakdown: Vec<CategoryAmount>,
    /// Ascending, ending at `month`.
    pub trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone)]
pub struct GoalsView {
    /// High priority first.
    pub goals: Vec<(SavingsGoal, GoalProgress)>,
    pub summary: GoalsSummary,
}

fn refreshed_budgets(
    budgets: &[Budget],
    transactions: &[Transaction],
    month: MonthKey,
) -> Vec<Budget> {
    let mut seen = HashSet::new();
    for b in budgets.iter().filter(|b| b.month == month) {
        if !seen.insert(b.category.as_str()) {
            warn!(category = %b.category, %month, "duplicate budget counted twice");
        }
    }
    let refreshed = refresh_budget_spent(budgets, transactions, month);
    for b in refreshed.iter().filter(|b| b.spent > b.monthly_limit) {
        warn!(
            category = %b.category,
            %month,
            limit = %b.monthly_limit,
            spent = %b.spent,
            "over budget"
        );
    }
    refreshed
}

#[instrument(skip(store))]
pub async fn dashboard<S: RecordStore>(store: &S, month: MonthKey) -> Result<Dashboard> {
    let all = TransactionFilter::all();
    let budget_filter = BudgetFilter::month(month);
    let (transactions, budgets, goals) = tokio::try_join!(
        store.list_transactions(&all),
        store.list_budgets(&budget_filter),
        store.list_goals(),
    )?;

    let totals = compute_month_totals(&transactions, month);
    let budgets = refreshed_budgets(&budgets, &transactions, month);
    let budget = compute_budget_summary(&budgets, month);
    let health = budget_health(&budget);
    let goals = compute_goals_summary(&goals);
    debug!(%totals.balance, %health, "dashboard computed");

    Ok(Dashboard {
        month,
        totals,
        budget,
        health,
        goals,
        recent: transactions.into_iter().take(RECENT_LIMIT).collect(),
    })
}

#[instrument(skip(store))]
pub async fn transactions<S: RecordStore>(
    store: &S,
    month: MonthKey,
) -> Result<TransactionsView> {
    let mut transactions = store
        .list_transactions(&TransactionFilter::month(month))
        .await?;
    sort_chronological(&mut transactions);
    Ok(TransactionsView {
        month,
        totals: compute_month_totals(&transactions, month),
        transactions,
    })
}

#[instrument(skip(store))]
pub async fn budgets<S: RecordStore>(store: &S, month: MonthKey) -> Result<BudgetsView> {
    let txn_filter = TransactionFilter::month(month);
    let budget_filter = BudgetFilter::month(month);
    let (transactions, budgets) = tokio::try_join!(
        store.list_transactions(&txn_filter),
        store.list_budgets(&budget_filter),
    )?;

    let budgets = refreshed_budgets(&budgets, &transactions, month);
    let summary = compute_budget_summary(&budgets, month);
    Ok(BudgetsView {
        month,
        budgets: budgets
            .into_iter()
            .map(|b| {
                let usage = budget_usage(&b);
                (b, usage)
            })
            .collect(),
        summary,
    })
}

/// Category breakdown for `month` plus a trend over the `months` ending there.
#[instrument(skip(store))]
pub async fn charts<S: RecordStore>(
    store: &S,
    month: MonthKey,
    months: usize,
) -> Result<ChartsView> {
    let transactions = store.list_transactions(&TransactionFilter::all()).await?;
    let mut breakdown = compute_category_breakdown(&transactions, month);
    sort_breakdown_descending(&mut breakdown);
    let trend = compute_income_expense_trend(&transactions, &month.trailing(months));
    Ok(ChartsView {
        month,
        breakdown,
        trend,
    })
}

#[instrument(skip(store))]
pub async fn goals<S: RecordStore>(store: &S) -> Result<GoalsView> {
    let goals = store.list_goals().await?;
    let summary = compute_goals_summary(&goals);
    Ok(GoalsView {
        goals: sort_goals_by_priority(&goals)
            .into_iter()
            .map(|g| {
                let progress = goal_progress(&g);
                (g, progress)
            })
            .collect(),
        summary,
    })
}
