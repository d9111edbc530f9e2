mod budget;
pub mod category;
mod goal;
mod transaction;

pub use budget::Budget;
pub use category::Category;
pub use goal::{add_contribution_to, validate_contribution, Priority, SavingsGoal};
pub use transaction::{Transaction, TransactionType};
