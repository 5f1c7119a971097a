//! Mail relay configuration

use serde::{Deserialize, Serialize};

use pum_core::{PumError, PumResult};

/// Configuration for the notification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Sender address.
    pub from_email: String,
    /// Display name for the sender.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Administrator distribution list for per-server summaries.
    pub admin_recipients: Vec<String>,
}

fn default_smtp_port() -> u16 {
    25
}

fn default_from_name() -> String {
    "Perforce User Management".to_string()
}

impl NotifyConfig {
    pub fn new(
        smtp_host: impl Into<String>,
        from_email: impl Into<String>,
        admin_recipients: Vec<String>,
    ) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port: default_smtp_port(),
            from_email: from_email.into(),
            from_name: default_from_name(),
            admin_recipients,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    pub fn validate(&self) -> PumResult<()> {
        if self.smtp_host.is_empty() {
            return Err(PumError::invalid_configuration("SMTP host is required"));
        }
        if self.from_email.is_empty() {
            return Err(PumError::invalid_configuration(
                "sender address is required",
            ));
        }
        if self.admin_recipients.is_empty() {
            return Err(PumError::invalid_configuration(
                "at least one administrator recipient is required",
            ));
        }
        Ok(())
    }
}
