//! Manager lookup with fallback text

use std::sync::Arc;

use tracing::debug;

use crate::error::PumResult;
use crate::traits::DirectoryClient;
use crate::types::{ManagerEntry, NO_MANAGERS_EMAIL, NO_MANAGER_EMAIL, NO_MANAGER_IN_LDAP};

/// Manager email and display name, possibly sentinel values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerContact {
    pub email: String,
    pub display_name: String,
}

impl ManagerContact {
    /// The pair used when a user has no manager reference at all.
    pub fn unknown() -> Self {
        Self {
            email: NO_MANAGER_EMAIL.to_string(),
            display_name: NO_MANAGER_IN_LDAP.to_string(),
        }
    }
}

impl From<ManagerEntry> for ManagerContact {
    fn from(entry: ManagerEntry) -> Self {
        match entry {
            ManagerEntry {
                mail: Some(email),
                display_name: Some(display_name),
            } => Self {
                email,
                display_name,
            },
            ManagerEntry { display_name, .. } => Self {
                email: NO_MANAGERS_EMAIL.to_string(),
                display_name: display_name.unwrap_or_else(|| NO_MANAGER_IN_LDAP.to_string()),
            },
        }
    }
}

/// Resolves a manager reference to contact details.
pub struct ManagerResolver {
    directory: Arc<dyn DirectoryClient>,
}

impl ManagerResolver {
    pub fn new(directory: Arc<dyn DirectoryClient>) -> Self {
        Self { directory }
    }

    /// Look up the manager entry behind `manager_ref`.
    ///
    /// A reference that resolves to nothing yields [`ManagerContact::unknown`].
    pub async fn resolve(&self, manager_ref: &str) -> PumResult<ManagerContact> {
        match self.directory.find_manager(manager_ref).await? {
            Some(entry) => Ok(ManagerContact::from(entry)),
            None => {
                debug!(manager_ref = %manager_ref, "Manager reference not found in directory");
                Ok(ManagerContact::unknown())
            }
        }
    }
}
