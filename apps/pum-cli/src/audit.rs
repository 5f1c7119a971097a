//! Per-server CSV audit files

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use pum_core::{AuditSink, DepartedUser, PumError, PumResult};

const HEADER: [&str; 5] = ["Name", "Username", "Email", "Manager's email", "LDAP Name"];

/// Appends departed users to one CSV file per server per day.
#[derive(Debug, Clone)]
pub struct CsvAuditWriter {
    dir: PathBuf,
    date: Option<NaiveDate>,
}

impl CsvAuditWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            date: None,
        }
    }

    /// Pin the date used in file names instead of today's.
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Path of the audit file for `server`.
    pub fn path_for(&self, server: &str) -> PathBuf {
        let date = self
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        self.dir.join(file_name(server, date))
    }
}

/// `PerforceDepartedUsers-<server>-<dd.mm.YYYY>.csv`
pub fn file_name(server: &str, date: NaiveDate) -> String {
    format!(
        "PerforceDepartedUsers-{}-{}.csv",
        sanitize(server),
        date.format("%d.%m.%Y")
    )
}

/// Replace characters that are not safe in file names.
fn sanitize(server: &str) -> String {
    server
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn is_empty_or_missing(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
}

impl AuditSink for CsvAuditWriter {
    fn record(&self, server: &str, departed: &[DepartedUser]) -> PumResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            PumError::persistence_with_source(
                format!("cannot create audit directory {}", self.dir.display()),
                e,
            )
        })?;

        let path = self.path_for(server);
        let write_header = is_empty_or_missing(&path);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                PumError::persistence_with_source(format!("cannot open {}", path.display()), e)
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let to_persistence = |e: csv::Error| {
            PumError::persistence_with_source(format!("cannot write {}", path.display()), e)
        };

        if write_header {
            writer.write_record(HEADER).map_err(to_persistence)?;
        }
        for user in departed {
            writer
                .write_record([
                    user.name.as_str(),
                    user.username.as_str(),
                    user.email.as_str(),
                    user.manager_email.as_str(),
                    user.ldap_name.as_str(),
                ])
                .map_err(to_persistence)?;
        }
        writer.flush().map_err(|e| {
            PumError::persistence_with_source(format!("cannot flush {}", path.display()), e)
        })?;

        info!(path = %path.display(), rows = departed.len(), "Audit record written");
        Ok(())
    }
}
