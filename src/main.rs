mod run;

use anyhow::{Context, Result};
use fintrack::config::{Config, StoreKind};
use fintrack::{MemoryStore, SqliteStore};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env()?;
    init_tracing(&config);

    match config.store {
        StoreKind::Sqlite => {
            config.ensure_db_dir().with_context(|| {
                format!("Failed to create data directory for {}", config.db_path.display())
            })?;
            let store = SqliteStore::open(&config.db_path)
                .with_context(|| format!("Failed to open {}", config.db_path.display()))?;
            run::as_cli(&args, &store, &config).await
        }
        StoreKind::Memory => {
            let store = MemoryStore::mock()?;
            run::as_cli(&args, &store, &config).await
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid log filter '{}': {e}", config.log_filter);
        EnvFilter::new("fintrack=warn")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
