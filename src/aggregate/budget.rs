use rust_decimal::Decimal;
use serde::Serialize;

use super::{ratio_percent, saturating_sum};
use crate::models::{Budget, Transaction};
use crate::month::MonthKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BudgetSummary {
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
    pub percentage: Decimal,
    /// Number of budgets in the month.
    pub categories: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetUsage {
    pub percentage: Decimal,
    /// Negative when over budget.
    pub remaining: Decimal,
}

/// Recompute `spent` for every budget in `month` from its expense transactions.
///
/// Budgets for other months pass through untouched. Run this before
/// [`compute_budget_summary`]; the stored `spent` goes stale on its own.
pub fn refresh_budget_spent(
    budgets: &[Budget],
    transactions: &[Transaction],
    month: MonthKey,
) -> Vec<Budget> {
    budgets
        .iter()
        .map(|b| {
            let mut budget = b.clone();
            if budget.month == month {
                budget.spent = saturating_sum(
                    transactions
                        .iter()
                        .filter(|t| {
                            t.is_expense() && t.month() == month && t.category == budget.category
                        })
                        .map(|t| t.amount),
                );
            }
            budget
        })
        .collect()
}

/// Totals across the budgets of `month`, trusting each budget's `spent`.
pub fn compute_budget_summary(budgets: &[Budget], month: MonthKey) -> BudgetSummary {
    let in_month: Vec<&Budget> = budgets.iter().filter(|b| b.month == month).collect();
    let total_budget = saturating_sum(in_month.iter().map(|b| b.monthly_limit));
    let total_spent = saturating_sum(in_month.iter().map(|b| b.spent));
    BudgetSummary {
        total_budget,
        total_spent,
        remaining: total_budget.saturating_sub(total_spent),
        percentage: ratio_percent(total_spent, total_budget),
        categories: in_month.len(),
    }
}

pub fn budget_usage(budget: &Budget) -> BudgetUsage {
    BudgetUsage {
        percentage: ratio_percent(budget.spent, budget.monthly_limit),
        remaining: budget.monthly_limit.saturating_sub(budget.spent),
    }
}
