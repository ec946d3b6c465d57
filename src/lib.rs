mod cli;
pub mod clock;
pub mod coordinator;
pub mod db;
pub mod errors;
pub mod jar;
pub mod models;
pub mod settings;
pub mod share;
pub mod storage;
pub mod store;

pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::coordinator::ViewCoordinator;
pub use crate::db::Database;
pub use crate::errors::{AppError, AppResult};
pub use crate::models::{AppSettings, AppView, BackfillPolicy, Jar, JarStats, MemoryStar, MonthGroup};
pub use crate::storage::{MemoryStorage, SlotStorage};
pub use crate::store::JarStore;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

pub const DATA_DIR_ENV: &str = "STAR_JAR_DATA_DIR";
const DB_FILE_NAME: &str = "jar.sqlite";

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Opens the SQLite-backed store under `data_dir` with the system clock.
pub fn open_store(data_dir: &Path) -> AppResult<JarStore> {
    let db = Database::new(&data_dir.join(DB_FILE_NAME))?;
    tracing::debug!(path = %db.path().display(), "opened jar database");
    Ok(JarStore::new(Arc::new(db), Arc::new(SystemClock)))
}

/// `$STAR_JAR_DATA_DIR`, falling back to `.star-jar` in the home directory.
pub fn default_data_dir() -> AppResult<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    #[cfg(unix)]
    {
        if let Ok(home) = std::env::var("HOME") {
            return Ok(PathBuf::from(home).join(".star-jar"));
        }
    }

    #[cfg(windows)]
    {
        if let Ok(home) = std::env::var("USERPROFILE") {
            return Ok(PathBuf::from(home).join(".star-jar"));
        }
    }

    Err(AppError::NotFound(format!(
        "Unable to determine a data directory; set {DATA_DIR_ENV}"
    )))
}

pub fn init_tracing(log_dir: &Path) -> AppResult<()> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "star-jar.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}

pub fn run() {
    if let Err(error) = cli::run() {
        eprintln!("{}", to_client_error(error));
        std::process::exit(1);
    }
}

fn to_client_error(error: impl std::fmt::Display) -> String {
    error.to_string()
}
