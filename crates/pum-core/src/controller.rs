//! Run loop over the configured servers
//!
//! The directory session spans the whole run. Each server gets its own
//! Perforce session and its own [`ServerRun`] context; both are gone before
//! the next server starts.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::PumResult;
use crate::reconcile::ReconciliationEngine;
use crate::removal::RemovalWorkflow;
use crate::report::{
    ReconciliationOutcome, RemovalReport, RunSummary, ServerOutcome, ServerReport,
};
use crate::traits::{AuditSink, DirectoryClient, Notifier, ResourceConnector, ResourceSession};
use crate::types::{ResourceUser, RunMode};

/// Per-server state. Created empty for each server and consumed into a
/// [`ServerReport`] at the end of the iteration.
#[derive(Debug)]
pub struct ServerRun {
    server: String,
    mode: RunMode,
    users: Vec<ResourceUser>,
    outcome: ReconciliationOutcome,
    removal: RemovalReport,
}

impl ServerRun {
    pub fn new(server: impl Into<String>, mode: RunMode) -> Self {
        Self {
            server: server.into(),
            mode,
            users: Vec::new(),
            outcome: ReconciliationOutcome::default(),
            removal: RemovalReport::default(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn users(&self) -> &[ResourceUser] {
        &self.users
    }

    pub fn outcome(&self) -> &ReconciliationOutcome {
        &self.outcome
    }

    fn into_report(self, server_name: String) -> ServerReport {
        ServerReport {
            server: self.server,
            server_name,
            mode: self.mode,
            departed: self.outcome.departed,
            inconclusive: self.outcome.inconclusive,
            notified: self.removal.notified,
            removed: self.removal.removed,
            removal_error: None,
        }
    }
}

/// Drives reconciliation and removal across a list of servers.
pub struct ServerRunController {
    directory: Arc<dyn DirectoryClient>,
    resources: Arc<dyn ResourceConnector>,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn Notifier>,
    engine: ReconciliationEngine,
    removal: RemovalWorkflow,
}

impl ServerRunController {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        resources: Arc<dyn ResourceConnector>,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let engine = ReconciliationEngine::new(Arc::clone(&directory));
        let removal = RemovalWorkflow::new(Arc::clone(&notifier));
        Self {
            directory,
            resources,
            audit,
            notifier,
            engine,
            removal,
        }
    }

    /// Process every server in order.
    ///
    /// Fails only when the directory cannot be bound. Per-server failures are
    /// recorded in the summary; a run-fatal failure stops the loop early.
    pub async fn run(&self, servers: &[String], mode: RunMode) -> PumResult<RunSummary> {
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, mode = %mode, servers = servers.len(), "Starting run");

        self.directory.bind().await?;

        let mut summary = RunSummary {
            run_id,
            mode,
            servers: Vec::with_capacity(servers.len()),
        };

        for server in servers {
            match self.run_server(server, mode).await {
                Ok(report) => {
                    info!(
                        run_id = %run_id,
                        server = %server,
                        departed = report.departed.len(),
                        removed = report.removed.len(),
                        "Server completed"
                    );
                    summary.servers.push(ServerOutcome::Completed(report));
                }
                Err(e) => {
                    let fatal = e.is_run_fatal();
                    error!(
                        run_id = %run_id,
                        server = %server,
                        code = e.error_code(),
                        error = %e,
                        "Server failed"
                    );
                    summary.servers.push(ServerOutcome::Failed {
                        server: server.clone(),
                        error: e,
                    });
                    if fatal {
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.directory.unbind().await {
            warn!(run_id = %run_id, error = %e, "Error during directory unbind");
        }

        info!(
            run_id = %run_id,
            departed = summary.departed_count(),
            failed = summary.failed_servers().count(),
            "Run finished"
        );

        Ok(summary)
    }

    /// One server iteration. The session is disconnected whether or not
    /// processing succeeded.
    async fn run_server(&self, server: &str, mode: RunMode) -> PumResult<ServerReport> {
        let mut session = self.resources.login(server).await?;
        info!(server = %server, "Logged in to resource service");

        let result = self
            .process(ServerRun::new(server, mode), session.as_mut())
            .await;
        let disconnected = session.disconnect().await;

        match (result, disconnected) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(disconnect_err)) => {
                warn!(server = %server, error = %disconnect_err, "Error during disconnect");
                Err(e)
            }
        }
    }

    async fn process(
        &self,
        mut run: ServerRun,
        session: &mut dyn ResourceSession,
    ) -> PumResult<ServerReport> {
        run.users = session.users().await?;
        info!(server = %run.server, users = run.users.len(), "Fetched resource users");

        run.outcome = self.engine.reconcile(&run.users).await?;

        // Accounts removed before a failure still get audited and reported.
        let mut removal_error = None;
        if run.mode.is_modify() {
            match self
                .removal
                .apply(&run.outcome.departed, run.mode, &run.server, session)
                .await
            {
                Ok(removal) => run.removal = removal,
                Err(failure) => {
                    run.removal = failure.report;
                    removal_error = Some(failure.error);
                }
            }
        }

        let server_name = match session.server_name().await {
            Ok(name) => name,
            Err(e) => {
                warn!(server = %run.server, error = %e, "Could not read server name");
                run.server.clone()
            }
        };

        if let Err(e) = self.audit.record(&run.server, &run.outcome.departed) {
            error!(server = %run.server, error = %e, "Failed to write audit record");
        }

        let mut report = run.into_report(server_name);
        report.removal_error = removal_error.as_ref().map(ToString::to_string);

        if let Err(e) = self.notifier.notify_admins(&report).await {
            error!(server = %report.server, error = %e, "Failed to notify administrators");
        }

        match removal_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_server_run_is_empty() {
        let run = ServerRun::new("serverB", RunMode::Modify);
        assert_eq!(run.server(), "serverB");
        assert!(run.users().is_empty());
        assert!(run.outcome().departed.is_empty());
        assert!(run.outcome().inconclusive.is_empty());
    }

    #[test]
    fn test_into_report_carries_state() {
        let mut run = ServerRun::new("serverA", RunMode::ReadOnly);
        run.removal.removed.push("jsmith".to_string());

        let report = run.into_report("perforce-a".to_string());
        assert_eq!(report.server, "serverA");
        assert_eq!(report.server_name, "perforce-a");
        assert_eq!(report.mode, RunMode::ReadOnly);
        assert_eq!(report.removed, vec!["jsmith".to_string()]);
    }
}
