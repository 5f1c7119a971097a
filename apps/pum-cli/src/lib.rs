//! Perforce departed-user management
//!
//! Wires the LDAP directory, the Perforce connector, the SMTP notifier and the
//! CSV audit writer into a [`ServerRunController`] and maps the run outcome to
//! a process exit status.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

use std::sync::Arc;

use tracing::{error, info, warn};

use pum_connector_ldap::LdapDirectory;
use pum_connector_perforce::PerforceConnector;
use pum_core::{RunMode, RunSummary, ServerOutcome, ServerRunController};
use pum_notify::SmtpNotifier;

pub use audit::CsvAuditWriter;
pub use cli::Cli;
pub use config::{ConfigError, PumConfig};
pub use error::{CliError, CliResult};

/// Parse the run mode given on the command line.
pub fn parse_mode(raw: &str) -> CliResult<RunMode> {
    raw.parse::<RunMode>()
        .map_err(|_| CliError::InvalidMode(raw.to_string()))
}

/// Run the whole workflow with configuration from the environment.
pub async fn execute(cli: Cli) -> CliResult<()> {
    let mode = parse_mode(&cli.mode)?;

    let mut config = PumConfig::from_env()?;
    config.apply_server_overrides(&cli.servers);
    config.require_servers()?;

    if let Some(path) = logging::init(config.log_dir.as_deref())? {
        info!(path = %path.display(), "Logging to file");
    }

    run(&config, mode).await.map_err(|e| {
        error!(code = e.exit_code(), error = %e, "Run failed");
        e
    })
}

async fn run(config: &PumConfig, mode: RunMode) -> CliResult<()> {
    let directory = Arc::new(LdapDirectory::new(config.ldap.clone())?);
    let resources = Arc::new(PerforceConnector::new(config.perforce.clone())?);
    let notifier = Arc::new(SmtpNotifier::new(config.notify.clone())?);
    let audit = Arc::new(CsvAuditWriter::new(config.audit_dir.clone()));

    let controller = ServerRunController::new(directory, resources, audit, notifier);
    let summary = controller.run(&config.servers, mode).await?;

    conclude(summary)
}

/// Map a finished run to success or the error that decides the exit status.
pub fn conclude(summary: RunSummary) -> CliResult<()> {
    let total = summary.servers.len();
    let failed = summary.failed_servers().count();

    for outcome in summary.failed_servers() {
        if let ServerOutcome::Failed { server, error } = outcome {
            warn!(server = %server, code = error.error_code(), "Server not processed");
        }
    }

    let fatal = summary.servers.into_iter().find_map(|outcome| match outcome {
        ServerOutcome::Failed { error, .. } if error.is_run_fatal() => Some(error),
        _ => None,
    });
    if let Some(error) = fatal {
        return Err(CliError::Run(error));
    }

    if failed > 0 {
        return Err(CliError::ServersFailed { failed, total });
    }
    Ok(())
}
