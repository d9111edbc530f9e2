//! Display-ready values for the views: formatting, thresholds and insights.

mod format;
mod status;

pub use format::{
    format_amount, format_axis_thousands, format_compact_signed, format_date, format_percentage,
    format_short_date, progress_bar, truncate,
};
pub use status::{
    budget_health, goal_remaining_label, health_tone, priority_color, progress_percentage,
    remaining_label, BudgetStatus, Deadline, Tone, Trend,
};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::{CategoryAmount, GoalsSummary, MonthTotals, TrendPoint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub tone: Tone,
    pub trend: Option<(Trend, String)>,
}

/// Headline cards for the dashboard, in display order.
pub fn dashboard_cards(
    totals: &MonthTotals,
    health: Decimal,
    goals: &GoalsSummary,
) -> Vec<MetricCard> {
    let trend = Trend::of(totals.balance);
    vec![
        MetricCard {
            title: "Monthly Balance",
            value: format_amount(totals.balance),
            tone: trend.tone(),
            trend: Some((trend, format_compact_signed(totals.balance))),
        },
        MetricCard {
            title: "Monthly Income",
            value: format_amount(totals.income),
            tone: Tone::Primary,
            trend: None,
        },
        MetricCard {
            title: "Monthly Expenses",
            value: format_amount(totals.expenses),
            tone: Tone::Warning,
            trend: None,
        },
        MetricCard {
            title: "Budget Health",
            value: format_percentage(health, 1),
            tone: health_tone(health),
            trend: None,
        },
        MetricCard {
            title: "Savings Progress",
            value: format_percentage(goals.overall_progress, 1),
            tone: Tone::Info,
            trend: None,
        },
        MetricCard {
            title: "Active Goals",
            value: goals.active_goals_count.to_string(),
            tone: Tone::Warning,
            trend: None,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownInsights {
    pub highest_category: String,
    pub largest_expense: Decimal,
    pub active_categories: usize,
}

impl BreakdownInsights {
    /// `None` for a month without expenses. Order of `breakdown` does not matter.
    pub fn from_breakdown(breakdown: &[CategoryAmount]) -> Option<Self> {
        // first max wins on ties
        let top = breakdown
            .iter()
            .reduce(|best, c| if c.amount > best.amount { c } else { best })?;
        Some(Self {
            highest_category: top.category.clone(),
            largest_expense: top.amount,
            active_categories: breakdown.len(),
        })
    }
}

/// Share of the month's expenses per category, in the breakdown's order.
pub fn breakdown_shares(breakdown: &[CategoryAmount]) -> Vec<(String, Decimal)> {
    let total: Decimal = breakdown.iter().map(|c| c.amount).sum();
    breakdown
        .iter()
        .map(|c| (c.category.clone(), progress_percentage(c.amount, total)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendInsights {
    pub highest_income: Decimal,
    pub highest_expenses: Decimal,
}

impl TrendInsights {
    pub fn from_trend(trend: &[TrendPoint]) -> Option<Self> {
        if trend.is_empty() {
            return None;
        }
        Some(Self {
            highest_income: trend.iter().map(|p| p.income).max().unwrap_or_default(),
            highest_expenses: trend.iter().map(|p| p.expenses).max().unwrap_or_default(),
        })
    }
}
