//! Personal finance tracking: transactions, monthly budgets and savings goals,
//! with the derived metrics a dashboard needs.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod month;
pub mod overview;
pub mod present;
pub mod store;

pub use db::SqliteStore;
pub use error::{Error, Result};
pub use month::MonthKey;
pub use store::{MemoryStore, RecordStore, RecordWriter};
