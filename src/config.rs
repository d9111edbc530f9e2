//! Runtime settings, read from `FINTRACK_*` environment variables.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DB_VAR: &str = "FINTRACK_DB";
pub const LOG_VAR: &str = "FINTRACK_LOG";
pub const TREND_MONTHS_VAR: &str = "FINTRACK_TREND_MONTHS";
pub const STORE_VAR: &str = "FINTRACK_STORE";

const DEFAULT_LOG_FILTER: &str = "fintrack=warn";
const DEFAULT_TREND_MONTHS: usize = 6;
const DB_FILE_NAME: &str = "fintrack.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Sqlite,
    /// Seeded mock data, discarded on exit.
    Memory,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(Self::Sqlite),
            "memory" | "mock" => Ok(Self::Memory),
            other => Err(Error::invalid(format!(
                "Unknown store '{other}' (expected sqlite or memory)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_filter: String,
    pub trend_months: usize,
    pub store: StoreKind,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`; unset or blank values take defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = match var(DB_VAR) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let trend_months = match var(TREND_MONTHS_VAR) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(Error::invalid(format!(
                        "{TREND_MONTHS_VAR} must be a whole number of at least 1, got '{raw}'"
                    )))
                }
            },
            None => DEFAULT_TREND_MONTHS,
        };

        let store = var(STORE_VAR)
            .map(|raw| raw.parse::<StoreKind>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            db_path,
            log_filter: var(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            trend_months,
            store,
        })
    }

    /// Create the directory the database file lives in.
    pub fn ensure_db_dir(&self) -> std::io::Result<()> {
        match self.db_path.parent() {
            Some(dir) if dir != Path::new("") => std::fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "fintrack")
        .ok_or_else(|| Error::invalid("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().join(DB_FILE_NAME))
}
