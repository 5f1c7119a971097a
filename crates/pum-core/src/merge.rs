//! Departed-user record assembly
//!
//! The deprovisioned subtree is populated inconsistently: some disabled
//! accounts keep their full metadata, others have attributes stripped.
//! Complete hits are copied straight through; partial hits fall back field
//! by field to sentinel text, so a record is always produced.

use std::sync::Arc;

use tracing::debug;

use crate::error::PumResult;
use crate::resolver::{ManagerContact, ManagerResolver};
use crate::traits::DirectoryClient;
use crate::types::{DepartedUser, DirectoryHit, ResourceUser, NO_LDAP_EMAIL_PREFIX};

/// Builds [`DepartedUser`] records from a Perforce user and a directory hit.
pub struct RecordMerger {
    resolver: ManagerResolver,
}

impl RecordMerger {
    pub fn new(directory: Arc<dyn DirectoryClient>) -> Self {
        Self {
            resolver: ManagerResolver::new(directory),
        }
    }

    pub async fn merge(&self, user: &ResourceUser, hit: DirectoryHit) -> PumResult<DepartedUser> {
        let (email, display_name, contact) = match hit {
            DirectoryHit::Complete {
                mail,
                manager_ref,
                display_name,
                ..
            } => {
                let contact = self.resolver.resolve(&manager_ref).await?;
                (mail, display_name, contact)
            }
            DirectoryHit::Partial {
                mail,
                manager_ref,
                display_name,
            } => {
                debug!(username = %user.username, "Directory entry is incomplete, using fallbacks");
                let email = mail.unwrap_or_else(|| fallback_email(&user.email));
                let contact = match manager_ref {
                    Some(manager_ref) => self.resolver.resolve(&manager_ref).await?,
                    None => ManagerContact::unknown(),
                };
                (email, display_name, contact)
            }
        };

        Ok(DepartedUser {
            name: user.full_name.clone(),
            username: user.username.clone(),
            last_access: user.last_access.clone(),
            email,
            ldap_name: display_name.replace(',', "."),
            manager: contact.display_name,
            manager_email: contact.email,
        })
    }
}

/// Email text used when the directory entry has no mail attribute.
pub fn fallback_email(perforce_email: &str) -> String {
    format!("{NO_LDAP_EMAIL_PREFIX}{}", perforce_email.replace(',', " "))
}
