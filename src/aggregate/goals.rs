use rust_decimal::Decimal;
use serde::Serialize;

use super::{ratio_percent, saturating_sum};
use crate::models::SavingsGoal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GoalsSummary {
    pub total_target_amount: Decimal,
    pub total_current_amount: Decimal,
    pub total_remaining: Decimal,
    pub overall_progress: Decimal,
    pub active_goals_count: usize,
    pub completed_goals_count: usize,
    pub total_goals_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub percentage: Decimal,
    pub remaining: Decimal,
    pub completed: bool,
}

/// Goals are global, so there is no month filter.
pub fn compute_goals_summary(goals: &[SavingsGoal]) -> GoalsSummary {
    let total_target_amount = saturating_sum(goals.iter().map(|g| g.target_amount));
    let total_current_amount = saturating_sum(goals.iter().map(|g| g.current_amount));
    let completed_goals_count = goals.iter().filter(|g| g.is_completed()).count();
    GoalsSummary {
        total_target_amount,
        total_current_amount,
        total_remaining: total_target_amount.saturating_sub(total_current_amount),
        overall_progress: ratio_percent(total_current_amount, total_target_amount),
        active_goals_count: goals.len() - completed_goals_count,
        completed_goals_count,
        total_goals_count: goals.len(),
    }
}

pub fn goal_progress(goal: &SavingsGoal) -> GoalProgress {
    GoalProgress {
        percentage: ratio_percent(goal.current_amount, goal.target_amount),
        remaining: goal.target_amount.saturating_sub(goal.current_amount),
        completed: goal.is_completed(),
    }
}

/// High, then medium, then low. Stable.
pub fn sort_goals_by_priority(goals: &[SavingsGoal]) -> Vec<SavingsGoal> {
    let mut sorted = goals.to_vec();
    sorted.sort_by_key(|g| g.priority.rank());
    sorted
}
