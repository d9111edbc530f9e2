use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank; lower comes first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "high" | "h" => Ok(Self::High),
            "medium" | "med" | "m" => Ok(Self::Medium),
            "low" | "l" => Ok(Self::Low),
            other => Err(Error::invalid(format!(
                "Unknown priority '{other}' (expected high, medium or low)"
            ))),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub target_amount: Decimal,
    /// Only grows, through contributions.
    #[serde(default)]
    pub current_amount: Decimal,
    pub deadline: NaiveDate,
    pub priority: Priority,
    #[serde(default)]
    pub created_at: String,
}

impl SavingsGoal {
    pub fn new(
        name: String,
        target_amount: Decimal,
        deadline: NaiveDate,
        priority: Priority,
    ) -> Result<Self> {
        Self::new_as_of(
            name,
            target_amount,
            deadline,
            priority,
            chrono::Local::now().date_naive(),
        )
    }

    /// Like [`SavingsGoal::new`], checking the deadline against `today`.
    pub fn new_as_of(
        name: String,
        target_amount: Decimal,
        deadline: NaiveDate,
        priority: Priority,
        today: NaiveDate,
    ) -> Result<Self> {
        let goal = Self {
            id: None,
            name,
            target_amount,
            current_amount: Decimal::ZERO,
            deadline,
            priority,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        goal.validate_deadline(today)?;
        goal.validate()?;
        Ok(goal)
    }

    /// New goals need a deadline strictly after `today`.
    pub fn validate_deadline(&self, today: NaiveDate) -> Result<()> {
        if self.deadline <= today {
            return Err(Error::invalid("Deadline must be in the future"));
        }
        Ok(())
    }

    /// Saved amount after contributing `amount`.
    pub fn with_contribution(&self, amount: Decimal) -> Result<Decimal> {
        add_contribution_to(self.current_amount, amount)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid("Goal name is required"));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(Error::invalid("Please enter a valid target amount"));
        }
        if self.current_amount < Decimal::ZERO {
            return Err(Error::invalid("Saved amount cannot be negative"));
        }
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

/// `current + amount`, rejecting a total too large to store.
pub fn add_contribution_to(current: Decimal, amount: Decimal) -> Result<Decimal> {
    current
        .checked_add(amount)
        .ok_or_else(|| Error::invalid("Contribution would exceed the largest supported amount"))
}

/// Rejects contributions that are not strictly positive.
pub fn validate_contribution(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::invalid("Please enter a valid contribution amount"));
    }
    Ok(())
}
