//! Mode-gated notification and account removal

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::report::{RemovalFailure, RemovalReport};
use crate::traits::{Notifier, ResourceSession};
use crate::types::{DepartedUser, RunMode};

/// Notifies managers and removes departed accounts.
///
/// The manager is always notified before the account is removed, while the
/// account still exists.
pub struct RemovalWorkflow {
    notifier: Arc<dyn Notifier>,
}

impl RemovalWorkflow {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Apply removals for one server.
    ///
    /// Read-only mode has no side effects. In modify mode a failed
    /// notification is logged and the removal still happens. A failed
    /// removal stops the pass; the error carries the accounts already
    /// notified and removed.
    #[instrument(skip(self, departed, session), fields(departed = departed.len()))]
    pub async fn apply(
        &self,
        departed: &[DepartedUser],
        mode: RunMode,
        server: &str,
        session: &mut dyn ResourceSession,
    ) -> Result<RemovalReport, RemovalFailure> {
        let mut report = RemovalReport::default();

        if !mode.is_modify() {
            info!("Read-only mode, no accounts removed");
            return Ok(report);
        }

        for user in departed {
            if user.has_notifiable_manager() {
                match self.notifier.notify_manager(user, server).await {
                    Ok(()) => report.notified.push(user.username.clone()),
                    Err(e) => error!(
                        username = %user.username,
                        manager_email = %user.manager_email,
                        error = %e,
                        "Failed to notify manager"
                    ),
                }
            } else {
                warn!(
                    username = %user.username,
                    manager_email = %user.manager_email,
                    "No usable manager email, skipping notification"
                );
            }

            if let Err(error) = session.remove_user(&user.username).await {
                error!(username = %user.username, error = %error, "Failed to remove user");
                return Err(RemovalFailure { report, error });
            }
            info!(username = %user.username, "Removed departed user");
            report.removed.push(user.username.clone());
        }

        Ok(report)
    }
}
