//! Core record types
//!
//! Snapshots read from Perforce and the directory, and the merged record
//! produced for every departed account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PumError;

/// Email sentinel prefix used when the directory has no mail attribute.
pub const NO_LDAP_EMAIL_PREFIX: &str = "No email in LDAP. Perforce email: ";

/// Manager email used when the user has no manager reference.
pub const NO_MANAGER_EMAIL: &str = "No manager email";

/// Manager display name used when no manager entry could be determined.
pub const NO_MANAGER_IN_LDAP: &str = "No manager in ldap";

/// Manager email used when the manager entry exposes no mail attribute.
pub const NO_MANAGERS_EMAIL: &str = "No managers email";

/// A user account as reported by a Perforce server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUser {
    /// Login name, unique within a server.
    pub username: String,
    pub full_name: String,
    /// Last access time as rendered by the connector.
    pub last_access: String,
    /// Email registered in Perforce.
    pub email: String,
}

impl ResourceUser {
    pub fn new(
        username: impl Into<String>,
        full_name: impl Into<String>,
        last_access: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            full_name: full_name.into(),
            last_access: last_access.into(),
            email: email.into(),
        }
    }
}

/// Raw attributes read from one directory entry, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryAttributes {
    pub mail: Option<String>,
    pub manager_ref: Option<String>,
    pub account_name: Option<String>,
    pub display_name: Option<String>,
}

/// A directory search hit for an account in the deprovisioned scope.
///
/// The variant is chosen once, when the connector converts the raw entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryHit {
    /// Every expected attribute was returned.
    Complete {
        mail: String,
        manager_ref: String,
        account_name: String,
        display_name: String,
    },
    /// At least one attribute was stripped from the entry.
    Partial {
        mail: Option<String>,
        manager_ref: Option<String>,
        display_name: String,
    },
}

impl DirectoryHit {
    /// Display name of the entry, regardless of variant.
    pub fn display_name(&self) -> &str {
        match self {
            DirectoryHit::Complete { display_name, .. } => display_name,
            DirectoryHit::Partial { display_name, .. } => display_name,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, DirectoryHit::Complete { .. })
    }
}

impl From<DirectoryAttributes> for DirectoryHit {
    fn from(attrs: DirectoryAttributes) -> Self {
        match attrs {
            DirectoryAttributes {
                mail: Some(mail),
                manager_ref: Some(manager_ref),
                account_name: Some(account_name),
                display_name: Some(display_name),
            } => DirectoryHit::Complete {
                mail,
                manager_ref,
                account_name,
                display_name,
            },
            DirectoryAttributes {
                mail,
                manager_ref,
                display_name,
                ..
            } => DirectoryHit::Partial {
                mail,
                manager_ref,
                display_name: display_name.unwrap_or_default(),
            },
        }
    }
}

/// Attributes found on a manager's directory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerEntry {
    pub mail: Option<String>,
    pub display_name: Option<String>,
}

/// A departed user, enriched with directory and manager details.
///
/// `email` and `manager_email` always hold either a real value or one of the
/// sentinel strings defined in this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartedUser {
    pub name: String,
    pub username: String,
    pub last_access: String,
    pub email: String,
    /// Directory display name with `,` replaced by `.`.
    pub ldap_name: String,
    /// Manager display name.
    pub manager: String,
    pub manager_email: String,
}

impl DepartedUser {
    /// Whether a notification can be addressed to the manager.
    ///
    /// Only checks for an `@`, not a well-formed address.
    pub fn has_notifiable_manager(&self) -> bool {
        self.manager_email.contains('@')
    }
}

/// Whether a run only reports, or also notifies and removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    ReadOnly,
    Modify,
}

impl RunMode {
    pub fn is_modify(self) -> bool {
        self == RunMode::Modify
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::ReadOnly => write!(f, "read-only"),
            RunMode::Modify => write!(f, "modify"),
        }
    }
}

impl FromStr for RunMode {
    type Err = PumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "r" | "read-only" => Ok(RunMode::ReadOnly),
            "m" | "modify" => Ok(RunMode::Modify),
            other => Err(PumError::invalid_configuration(format!(
                "{other} is not a valid mode (use r for read-only or m for modify)"
            ))),
        }
    }
}
