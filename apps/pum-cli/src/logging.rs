//! Tracing subscriber setup

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

const DEFAULT_FILTER: &str = "info,pum_core=debug,pum_cli=debug";

/// Name of the daily log file.
pub fn log_file_name(date: NaiveDate) -> String {
    format!("PUM_Log_{}.txt", date.format("%d.%m.%Y"))
}

/// Install the global subscriber.
///
/// Writes to stdout, or appends to the day's log file inside `log_dir`.
/// Returns the log file path when one is used.
pub fn init(log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let Some(dir) = log_dir else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    };

    fs::create_dir_all(dir)?;
    let path = dir.join(log_file_name(chrono::Local::now().date_naive()));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(Some(path))
}
