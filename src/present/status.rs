use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::format::format_amount;
use crate::aggregate::{ratio_percent, BudgetSummary, GoalProgress};
use crate::models::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Up for zero and above.
    pub fn of(val: Decimal) -> Self {
        if val >= Decimal::ZERO {
            Self::Up
        } else {
            Self::Down
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Up => Tone::Success,
            Self::Down => Tone::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Primary,
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetStatus {
    OnTrack,
    Monitor,
    ApproachingLimit,
    OverBudget,
}

impl BudgetStatus {
    pub fn from_percentage(percentage: Decimal) -> Self {
        if percentage < Decimal::from(50) {
            Self::OnTrack
        } else if percentage < Decimal::from(80) {
            Self::Monitor
        } else if percentage < Decimal::ONE_HUNDRED {
            Self::ApproachingLimit
        } else {
            Self::OverBudget
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OnTrack => "On track",
            Self::Monitor => "Monitor spending",
            Self::ApproachingLimit => "Approaching limit",
            Self::OverBudget => "Over budget",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::OnTrack => Tone::Success,
            Self::Monitor | Self::ApproachingLimit => Tone::Warning,
            Self::OverBudget => Tone::Error,
        }
    }
}

/// Share of the month's budget still unspent, floored at 0; 100 with no budget.
pub fn budget_health(summary: &BudgetSummary) -> Decimal {
    if summary.total_budget > Decimal::ZERO {
        let left = summary.total_budget.saturating_sub(summary.total_spent);
        ratio_percent(left, summary.total_budget).max(Decimal::ZERO)
    } else {
        Decimal::ONE_HUNDRED
    }
}

pub fn health_tone(health: Decimal) -> Tone {
    if health >= Decimal::from(80) {
        Tone::Success
    } else if health >= Decimal::from(50) {
        Tone::Warning
    } else {
        Tone::Error
    }
}

/// `value / max` as a percentage clamped to 0..=100; 0 when `max` is not positive.
pub fn progress_percentage(value: Decimal, max: Decimal) -> Decimal {
    if max <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ratio_percent(value, max).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// "Remaining: $x" or "Over by: $x".
pub fn remaining_label(remaining: Decimal) -> String {
    if remaining >= Decimal::ZERO {
        format!("Remaining: {}", format_amount(remaining))
    } else {
        format!("Over by: {}", format_amount(remaining.abs()))
    }
}

pub fn goal_remaining_label(progress: &GoalProgress) -> String {
    if progress.completed {
        "Goal Achieved!".to_string()
    } else {
        format_amount(progress.remaining)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Deadline {
    DaysLeft(i64),
    Overdue(i64),
}

impl Deadline {
    pub fn until(deadline: NaiveDate, today: NaiveDate) -> Self {
        let days = (deadline - today).num_days();
        if days < 0 {
            Self::Overdue(-days)
        } else {
            Self::DaysLeft(days)
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, Self::Overdue(_))
    }
}

impl std::fmt::Display for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DaysLeft(d) => write!(f, "{d} days left"),
            Self::Overdue(d) => write!(f, "{d} days overdue"),
        }
    }
}

pub fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "#ef4444",
        Priority::Medium => "#f59e0b",
        Priority::Low => "#10b981",
    }
}
