use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the category reserved for income.
pub const INCOME: &str = "Income";

const DEFAULT_COLOR: &str = "#6b7280";
const DEFAULT_ICON: &str = "Tag";

/// Built-in categories: (name, color, icon).
pub const DEFAULTS: &[(&str, &str, &str)] = &[
    ("Food & Dining", "#ef4444", "UtensilsCrossed"),
    ("Transportation", "#3b82f6", "Car"),
    ("Shopping", "#8b5cf6", "ShoppingBag"),
    ("Entertainment", "#f59e0b", "Film"),
    ("Bills & Utilities", "#10b981", "Receipt"),
    ("Healthcare", "#ec4899", "Heart"),
    ("Education", "#06b6d4", "GraduationCap"),
    ("Travel", "#84cc16", "Plane"),
    (INCOME, "#22c55e", "TrendingUp"),
    ("Other", DEFAULT_COLOR, DEFAULT_ICON),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(default)]
    pub is_custom: bool,
}

impl Category {
    /// A user-defined category.
    pub fn new(name: String) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::invalid("Category name is required"));
        }
        Ok(Self {
            id: None,
            name,
            color: DEFAULT_COLOR.to_string(),
            icon: DEFAULT_ICON.to_string(),
            is_custom: true,
        })
    }

    pub fn builtin(name: &str, color: &str, icon: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            is_custom: false,
        }
    }

    pub fn defaults() -> Vec<Category> {
        DEFAULTS
            .iter()
            .map(|(name, color, icon)| Self::builtin(name, color, icon))
            .collect()
    }

    pub fn is_income(&self) -> bool {
        self.name == INCOME
    }

    /// Categories offered when creating an expense budget.
    pub fn budgetable(categories: &[Category]) -> Vec<&Category> {
        categories.iter().filter(|c| !c.is_income()).collect()
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// Color for a category name, falling back to neutral gray.
    pub fn color_for<'a>(categories: &'a [Category], name: &str) -> &'a str {
        categories
            .iter()
            .find(|c| c.name == name)
            .map_or(DEFAULT_COLOR, |c| c.color.as_str())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
