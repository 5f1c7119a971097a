//! LDAP directory configuration

use serde::{Deserialize, Serialize};

use pum_core::{PumError, PumResult};

/// Configuration for the directory client.
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapDirectoryConfig {
    /// LDAP server hostname or IP address.
    pub host: String,

    /// LDAP server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_ldap_port")]
    pub port: u16,

    /// Use SSL/TLS (LDAPS).
    #[serde(default)]
    pub use_ssl: bool,

    /// Bind DN or account used for the service session.
    pub bind_dn: String,

    /// Bind password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Container holding disabled accounts.
    #[serde(default = "default_deprovisioned_base_dn")]
    pub deprovisioned_base_dn: String,

    /// Attribute holding the account name matched against Perforce usernames.
    #[serde(default = "default_account_attribute")]
    pub account_attribute: String,

    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
}

impl std::fmt::Debug for LdapDirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDirectoryConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("deprovisioned_base_dn", &self.deprovisioned_base_dn)
            .field("account_attribute", &self.account_attribute)
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .finish()
    }
}

fn default_ldap_port() -> u16 {
    389
}

fn default_deprovisioned_base_dn() -> String {
    "OU=Accounts,OU=Disabled".to_string()
}

fn default_account_attribute() -> String {
    "AccountName".to_string()
}

fn default_connection_timeout() -> u64 {
    30
}

impl LdapDirectoryConfig {
    /// Create a new config with required fields.
    pub fn new(host: impl Into<String>, bind_dn: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_ldap_port(),
            use_ssl: false,
            bind_dn: bind_dn.into(),
            bind_password: None,
            deprovisioned_base_dn: default_deprovisioned_base_dn(),
            account_attribute: default_account_attribute(),
            connection_timeout_secs: default_connection_timeout(),
        }
    }

    /// Set bind password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.bind_password = Some(password.into());
        self
    }

    /// Enable SSL (LDAPS).
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self.port = 636;
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the deprovisioned accounts container.
    pub fn with_deprovisioned_base_dn(mut self, dn: impl Into<String>) -> Self {
        self.deprovisioned_base_dn = dn.into();
        self
    }

    /// Set the account-name attribute.
    pub fn with_account_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.account_attribute = attribute.into();
        self
    }

    #[must_use]
    pub fn with_connection_timeout(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }

    /// Get the LDAP URL.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn validate(&self) -> PumResult<()> {
        if self.host.is_empty() {
            return Err(PumError::invalid_configuration("LDAP host is required"));
        }

        if self.bind_dn.is_empty() {
            return Err(PumError::invalid_configuration("LDAP bind DN is required"));
        }

        if self.deprovisioned_base_dn.is_empty() {
            return Err(PumError::invalid_configuration(
                "deprovisioned base DN is required",
            ));
        }

        if self.account_attribute.is_empty() {
            return Err(PumError::invalid_configuration(
                "account attribute is required",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LdapDirectoryConfig::new("ldap.example.com", "service_acct");
        assert_eq!(config.port, 389);
        assert_eq!(config.deprovisioned_base_dn, "OU=Accounts,OU=Disabled");
        assert_eq!(config.account_attribute, "AccountName");
        assert_eq!(config.url(), "ldap://ldap.example.com:389");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ssl_switches_port_and_scheme() {
        let config = LdapDirectoryConfig::new("ldap.example.com", "service_acct").with_ssl();
        assert_eq!(config.url(), "ldaps://ldap.example.com:636");
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let config = LdapDirectoryConfig::new("", "service_acct");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config =
            LdapDirectoryConfig::new("ldap.example.com", "service_acct").with_password("hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }
}
