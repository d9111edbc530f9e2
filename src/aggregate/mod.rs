//! Derived metrics over already-fetched entities.
//!
//! Every function here is pure: same input, same output, no I/O. Ratios whose
//! denominator is zero are defined as `0`. Sums saturate at the `Decimal`
//! bounds instead of overflowing.

mod budget;
mod goals;

pub use budget::{
    budget_usage, compute_budget_summary, refresh_budget_spent, BudgetSummary, BudgetUsage,
};
pub use goals::{
    compute_goals_summary, goal_progress, sort_goals_by_priority, GoalProgress, GoalsSummary,
};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, TransactionType};
use crate::month::MonthKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MonthTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Decimal,
}

/// A transaction paired with the cumulative net up to and including it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancedTransaction<'a> {
    pub transaction: &'a Transaction,
    pub running_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub month: MonthKey,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

/// Percentage `part / whole * 100`, or zero when `whole` is not positive.
///
/// A result too large to represent is clamped to `Decimal::MAX` (or `MIN`).
pub(crate) fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if part < Decimal::ZERO {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

pub(crate) fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

pub fn compute_month_totals(transactions: &[Transaction], month: MonthKey) -> MonthTotals {
    let (income, expenses) = transactions
        .iter()
        .filter(|t| t.month() == month)
        .fold((Decimal::ZERO, Decimal::ZERO), |(inc, exp), t| match t.kind {
            TransactionType::Income => (inc.saturating_add(t.amount), exp),
            TransactionType::Expense => (inc, exp.saturating_add(t.amount)),
        });
    MonthTotals {
        income,
        expenses,
        balance: income.saturating_sub(expenses),
    }
}

/// Expense totals per category for `month`, in order of first appearance.
///
/// Not sorted; use [`sort_breakdown_descending`] for largest-first.
pub fn compute_category_breakdown(
    transactions: &[Transaction],
    month: MonthKey,
) -> Vec<CategoryAmount> {
    let mut breakdown: Vec<CategoryAmount> = Vec::new();
    for t in transactions
        .iter()
        .filter(|t| t.is_expense() && t.month() == month)
    {
        match breakdown.iter_mut().find(|c| c.category == t.category) {
            Some(entry) => entry.amount = entry.amount.saturating_add(t.amount),
            None => breakdown.push(CategoryAmount {
                category: t.category.clone(),
                amount: t.amount,
            }),
        }
    }
    breakdown
}

/// Largest amount first; equal amounts keep their relative order.
pub fn sort_breakdown_descending(breakdown: &mut [CategoryAmount]) {
    breakdown.sort_by(|a, b| b.amount.cmp(&a.amount));
}

/// Left fold from zero over `transactions` in the order given.
///
/// Pass them oldest first (see [`sort_chronological`]); any insert or delete
/// upstream means recomputing the whole sequence.
pub fn compute_running_balance(transactions: &[Transaction]) -> Vec<BalancedTransaction<'_>> {
    transactions
        .iter()
        .scan(Decimal::ZERO, |balance, t| {
            *balance = balance.saturating_add(t.signed_amount());
            Some(BalancedTransaction {
                transaction: t,
                running_balance: *balance,
            })
        })
        .collect()
}

/// Oldest first; same-day entries ordered by id, unsaved ones last.
pub fn sort_chronological(transactions: &mut [Transaction]) {
    transactions.sort_by_key(|t| (t.date, t.id.unwrap_or(i64::MAX)));
}

/// Income, expenses and net per month, in the order of `months`.
pub fn compute_income_expense_trend(
    transactions: &[Transaction],
    months: &[MonthKey],
) -> Vec<TrendPoint> {
    months
        .iter()
        .map(|&month| {
            let totals = compute_month_totals(transactions, month);
            TrendPoint {
                month,
                income: totals.income,
                expenses: totals.expenses,
                net: totals.balance,
            }
        })
        .collect()
}
