//! Reconciliation and run reports

use serde::Serialize;
use uuid::Uuid;

use crate::error::PumError;
use crate::types::{DepartedUser, RunMode};

/// A user whose directory lookup failed and could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InconclusiveLookup {
    pub username: String,
    pub reason: String,
}

/// Result of joining one server's users against the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationOutcome {
    /// Departed users, in resource-service order.
    pub departed: Vec<DepartedUser>,
    /// Users that could not be classified. Never removed.
    pub inconclusive: Vec<InconclusiveLookup>,
}

/// What the removal workflow did on one server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    /// Usernames whose manager was notified.
    pub notified: Vec<String>,
    /// Usernames removed from the server.
    pub removed: Vec<String>,
}

/// A removal pass that stopped early, with what it did before stopping.
#[derive(Debug)]
pub struct RemovalFailure {
    pub report: RemovalReport,
    pub error: PumError,
}

/// Everything that happened on one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerReport {
    /// Server identifier as configured (e.g. `ssl:perforce:1666`).
    pub server: String,
    /// Name the server reported for itself.
    pub server_name: String,
    pub mode: RunMode,
    pub departed: Vec<DepartedUser>,
    pub inconclusive: Vec<InconclusiveLookup>,
    pub notified: Vec<String>,
    pub removed: Vec<String>,
    /// Why the removal pass stopped early, if it did.
    pub removal_error: Option<String>,
}

/// Outcome of one server iteration.
#[derive(Debug)]
pub enum ServerOutcome {
    Completed(ServerReport),
    Failed { server: String, error: PumError },
}

impl ServerOutcome {
    pub fn server(&self) -> &str {
        match self {
            ServerOutcome::Completed(report) => &report.server,
            ServerOutcome::Failed { server, .. } => server,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ServerOutcome::Failed { .. })
    }
}

/// Outcome of a whole run across the server list.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub mode: RunMode,
    pub servers: Vec<ServerOutcome>,
}

impl RunSummary {
    pub fn failed_servers(&self) -> impl Iterator<Item = &ServerOutcome> {
        self.servers.iter().filter(|s| s.is_failed())
    }

    pub fn departed_count(&self) -> usize {
        self.servers
            .iter()
            .map(|s| match s {
                ServerOutcome::Completed(report) => report.departed.len(),
                ServerOutcome::Failed { .. } => 0,
            })
            .sum()
    }
}
