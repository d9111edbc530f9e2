use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::month::MonthKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default)]
    pub id: Option<i64>,
    pub category: String,
    pub month: MonthKey,
    pub monthly_limit: Decimal,
    /// Cached; recompute with `aggregate::refresh_budget_spent` before use.
    #[serde(default)]
    pub spent: Decimal,
    #[serde(default)]
    pub rollover: Decimal,
}

impl Budget {
    pub fn new(category: String, month: MonthKey, monthly_limit: Decimal) -> Result<Self> {
        let budget = Self {
            id: None,
            category,
            month,
            monthly_limit,
            spent: Decimal::ZERO,
            rollover: Decimal::ZERO,
        };
        budget.validate()?;
        Ok(budget)
    }

    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(Error::invalid("Budget category is required"));
        }
        if self.monthly_limit < Decimal::ZERO {
            return Err(Error::invalid("Please enter a valid budget amount"));
        }
        Ok(())
    }
}
