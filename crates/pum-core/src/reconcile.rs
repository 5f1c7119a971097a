//! Cross-system identity join for one server

use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::error::PumResult;
use crate::merge::RecordMerger;
use crate::report::{InconclusiveLookup, ReconciliationOutcome};
use crate::traits::DirectoryClient;
use crate::types::ResourceUser;

/// Joins a server's users against the deprovisioned scope of the directory.
pub struct ReconciliationEngine {
    directory: Arc<dyn DirectoryClient>,
    merger: RecordMerger,
}

impl ReconciliationEngine {
    pub fn new(directory: Arc<dyn DirectoryClient>) -> Self {
        let merger = RecordMerger::new(Arc::clone(&directory));
        Self { directory, merger }
    }

    /// Classify every user, preserving input order.
    ///
    /// Users absent from the deprovisioned scope are active and skipped. A
    /// failed lookup is recorded as inconclusive; only run-fatal errors
    /// abort the pass.
    #[instrument(skip(self, users), fields(users = users.len()))]
    pub async fn reconcile(&self, users: &[ResourceUser]) -> PumResult<ReconciliationOutcome> {
        let mut outcome = ReconciliationOutcome::default();

        for user in users {
            let lookup = match self.directory.find_account(&user.username).await {
                Ok(Some(hit)) => self.merger.merge(user, hit).await.map(Some),
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            };

            match lookup {
                Ok(Some(departed)) => {
                    debug!(username = %user.username, "Account is deprovisioned");
                    outcome.departed.push(departed);
                }
                Ok(None) => {}
                Err(e) if e.is_run_fatal() => return Err(e),
                Err(e) => {
                    error!(
                        username = %user.username,
                        error = %e,
                        "Directory lookup failed, account left unclassified"
                    );
                    outcome.inconclusive.push(InconclusiveLookup {
                        username: user.username.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            departed = outcome.departed.len(),
            inconclusive = outcome.inconclusive.len(),
            "Reconciliation completed"
        );

        Ok(outcome)
    }
}
