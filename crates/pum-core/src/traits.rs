//! Collaborator traits
//!
//! The workflow talks to the directory, Perforce, the audit store and the
//! mail relay only through these traits.

use async_trait::async_trait;

use crate::error::PumResult;
use crate::report::ServerReport;
use crate::types::{DepartedUser, DirectoryHit, ManagerEntry, ResourceUser};

/// Scoped lookups against the identity directory.
///
/// A client is bound once per run and shared by every server iteration.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Establish the directory session.
    async fn bind(&self) -> PumResult<()>;

    /// Look up an account by name within the deprovisioned scope.
    ///
    /// Returns `Ok(None)` when the account is not deprovisioned.
    async fn find_account(&self, username: &str) -> PumResult<Option<DirectoryHit>>;

    /// Look up the entry a manager reference points to.
    async fn find_manager(&self, manager_ref: &str) -> PumResult<Option<ManagerEntry>>;

    /// Tear down the directory session. Later lookups fail.
    async fn unbind(&self) -> PumResult<()>;
}

/// Opens sessions against resource-management servers.
#[async_trait]
pub trait ResourceConnector: Send + Sync {
    /// Authenticate to `server` and return a session scoped to it.
    async fn login(&self, server: &str) -> PumResult<Box<dyn ResourceSession>>;
}

/// An authenticated session on one resource-management server.
///
/// Sessions are never reused across servers; `disconnect` must be called
/// before the next server's session is opened.
#[async_trait]
pub trait ResourceSession: Send {
    /// All user accounts, in the order the server returns them.
    async fn users(&mut self) -> PumResult<Vec<ResourceUser>>;

    /// Remove an account and everything it owns. Irreversible.
    async fn remove_user(&mut self, username: &str) -> PumResult<()>;

    /// Name the server reports for itself.
    async fn server_name(&mut self) -> PumResult<String>;

    async fn disconnect(&mut self) -> PumResult<()>;
}

/// Persists the per-server audit record.
pub trait AuditSink: Send + Sync {
    fn record(&self, server: &str, departed: &[DepartedUser]) -> PumResult<()>;
}

/// Sends manager and administrator notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell a departed user's manager that the account on `server` is being removed.
    async fn notify_manager(&self, user: &DepartedUser, server: &str) -> PumResult<()>;

    /// Send the per-server summary to the administrator list.
    async fn notify_admins(&self, report: &ServerReport) -> PumResult<()>;
}
