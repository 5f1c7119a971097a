use std::env::VarError;
use std::path::PathBuf;

use pum_connector_ldap::LdapDirectoryConfig;
use pum_connector_perforce::PerforceConfig;
use pum_notify::NotifyConfig;

/// Configuration for a reconciliation run.
#[derive(Debug, Clone)]
pub struct PumConfig {
    /// Perforce server ports, processed in order. May be empty until
    /// command-line overrides are applied.
    pub servers: Vec<String>,

    pub ldap: LdapDirectoryConfig,

    pub perforce: PerforceConfig,

    pub notify: NotifyConfig,

    /// Directory receiving the per-server CSV audit files.
    pub audit_dir: PathBuf,

    /// Directory for the daily log file. Logs go to stdout when unset.
    pub log_dir: Option<PathBuf>,
}

impl PumConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let servers = reader("PUM_SERVERS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        let ldap_host =
            reader("LDAP_HOST").map_err(|_| ConfigError::MissingVar("LDAP_HOST".into()))?;

        let use_ssl = match reader("LDAP_USE_SSL") {
            Ok(raw) => parse_bool("LDAP_USE_SSL", &raw)?,
            Err(_) => false,
        };

        let bind_dn = reader("LDAP_BIND_DN").unwrap_or_else(|_| "service_acct".to_string());

        let mut ldap = LdapDirectoryConfig::new(ldap_host, bind_dn);
        if use_ssl {
            ldap = ldap.with_ssl();
        }
        if let Ok(raw) = reader("LDAP_PORT") {
            ldap = ldap.with_port(parse_number("LDAP_PORT", &raw)?);
        }
        if let Ok(password) = reader("SVC_PWD") {
            ldap = ldap.with_password(password);
        }
        if let Ok(dn) = reader("LDAP_DEPROVISIONED_BASE_DN") {
            ldap = ldap.with_deprovisioned_base_dn(dn);
        }
        if let Ok(attribute) = reader("LDAP_ACCOUNT_ATTRIBUTE") {
            ldap = ldap.with_account_attribute(attribute);
        }
        if let Ok(raw) = reader("LDAP_TIMEOUT_SECS") {
            ldap = ldap.with_connection_timeout(parse_number("LDAP_TIMEOUT_SECS", &raw)?);
        }

        let p4_user = reader("P4USER").map_err(|_| ConfigError::MissingVar("P4USER".into()))?;
        let mut perforce = PerforceConfig::new(p4_user);
        if let Ok(bin) = reader("P4_BIN") {
            perforce = perforce.with_p4_bin(bin);
        }
        if let Ok(password) = reader("P4PASSWD") {
            perforce = perforce.with_password(password);
        }

        let smtp_host =
            reader("SMTP_HOST").map_err(|_| ConfigError::MissingVar("SMTP_HOST".into()))?;
        let smtp_port = match reader("SMTP_PORT") {
            Ok(raw) => parse_number("SMTP_PORT", &raw)?,
            Err(_) => 25,
        };
        let from_email =
            reader("PUM_MAIL_FROM").map_err(|_| ConfigError::MissingVar("PUM_MAIL_FROM".into()))?;
        let admin_recipients = reader("PUM_ADMIN_RECIPIENTS")
            .map(|raw| split_list(&raw))
            .map_err(|_| ConfigError::MissingVar("PUM_ADMIN_RECIPIENTS".into()))?;
        if admin_recipients.is_empty() {
            return Err(ConfigError::InvalidValue(
                "PUM_ADMIN_RECIPIENTS".into(),
                "no recipients listed".into(),
            ));
        }
        let notify = NotifyConfig::new(smtp_host, from_email, admin_recipients).with_port(smtp_port);

        let audit_dir = reader("PUM_AUDIT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let log_dir = reader("PUM_LOG_DIR").ok().map(PathBuf::from);

        Ok(Self {
            servers,
            ldap,
            perforce,
            notify,
            audit_dir,
            log_dir,
        })
    }

    /// Replace the configured server list when overrides are given.
    pub fn apply_server_overrides(&mut self, overrides: &[String]) {
        if !overrides.is_empty() {
            self.servers = overrides.to_vec();
        }
    }

    /// Fail when no server is configured.
    pub fn require_servers(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::MissingVar("PUM_SERVERS".into()));
        }
        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            key.into(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
