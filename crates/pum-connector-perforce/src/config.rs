//! Perforce client configuration

use serde::{Deserialize, Serialize};

use pum_core::{PumError, PumResult};

/// Configuration shared by every Perforce server in a run.
#[derive(Clone, Serialize, Deserialize)]
pub struct PerforceConfig {
    /// Path or name of the `p4` executable.
    #[serde(default = "default_p4_bin")]
    pub p4_bin: String,

    /// Super user the workflow logs in as.
    pub user: String,

    /// Password piped to `p4 login`. When absent an existing ticket is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for PerforceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerforceConfig")
            .field("p4_bin", &self.p4_bin)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .finish()
    }
}

fn default_p4_bin() -> String {
    "p4".to_string()
}

impl PerforceConfig {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            p4_bin: default_p4_bin(),
            user: user.into(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_p4_bin(mut self, p4_bin: impl Into<String>) -> Self {
        self.p4_bin = p4_bin.into();
        self
    }

    pub fn validate(&self) -> PumResult<()> {
        if self.user.is_empty() {
            return Err(PumError::invalid_configuration("Perforce user is required"));
        }
        if self.p4_bin.is_empty() {
            return Err(PumError::invalid_configuration(
                "p4 executable path is required",
            ));
        }
        Ok(())
    }
}
