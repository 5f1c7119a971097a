//! LDAP directory client
//!
//! Implements [`DirectoryClient`] over a single `ldap3` session that is bound
//! once and shared by every server in the run.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry, SearchResult};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use pum_core::{
    DirectoryAttributes, DirectoryClient, DirectoryHit, ManagerEntry, PumError, PumResult,
};

use crate::config::LdapDirectoryConfig;

/// LDAP result code for invalid credentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// LDAP result code for a base DN that does not exist.
const RC_NO_SUCH_OBJECT: u32 = 32;

const MAIL: &str = "mail";
const MANAGER: &str = "manager";
const NAME: &str = "name";
const DISPLAY_NAME: &str = "displayName";

/// How a search base that does not exist is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingBase {
    /// The base is a reference that may be stale; no entry.
    NotFound,
    /// The base is configured scope; a missing base is an error.
    Error,
}

/// Map a bind result code.
fn check_bind_result(rc: u32, text: &str, bind_dn: &str) -> PumResult<()> {
    match rc {
        0 => Ok(()),
        RC_INVALID_CREDENTIALS => Err(PumError::directory_auth(format!(
            "invalid credentials for {}",
            bind_dn
        ))),
        _ => Err(PumError::directory_query(format!(
            "LDAP bind failed with code {}: {}",
            rc, text
        ))),
    }
}

/// Map a search result code. `Ok(false)` means the base does not exist and
/// the search found nothing.
fn check_search_result(rc: u32, text: &str, base: &str, missing: MissingBase) -> PumResult<bool> {
    match (rc, missing) {
        (0, _) => Ok(true),
        (RC_NO_SUCH_OBJECT, MissingBase::NotFound) => Ok(false),
        (RC_NO_SUCH_OBJECT, MissingBase::Error) => Err(PumError::directory_query(format!(
            "search base '{}' does not exist: {}",
            base, text
        ))),
        _ => Err(PumError::directory_query(format!(
            "LDAP search under '{}' failed with code {}: {}",
            base, rc, text
        ))),
    }
}

/// Directory client backed by an LDAP server.
pub struct LdapDirectory {
    config: LdapDirectoryConfig,

    /// Bound session, `None` before bind and after unbind.
    connection: RwLock<Option<Ldap>>,
}

impl LdapDirectory {
    pub fn new(config: LdapDirectoryConfig) -> PumResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            connection: RwLock::new(None),
        })
    }

    /// Get the bound session.
    async fn session(&self) -> PumResult<Ldap> {
        let guard = self.connection.read().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| PumError::directory_query("directory session is not bound"))
    }

    /// Run a subtree search under `base`.
    async fn search(
        &self,
        base: &str,
        filter: &str,
        attrs: Vec<&str>,
        missing: MissingBase,
    ) -> PumResult<Vec<HashMap<String, Vec<String>>>> {
        let mut ldap = self.session().await?;

        debug!(base = %base, filter = %filter, "Searching LDAP");

        let SearchResult(entries, result) = ldap
            .search(base, Scope::Subtree, filter, attrs)
            .await
            .map_err(|e| PumError::directory_query_with_source("LDAP search failed", e))?;

        if !check_search_result(result.rc, &result.text, base, missing)? {
            debug!(base = %base, "Search base does not exist");
            return Ok(Vec::new());
        }

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| entry.attrs)
            .collect())
    }

    /// Escape special characters in LDAP filter values (RFC 4515).
    fn escape_ldap_value(value: &str) -> String {
        value
            .replace('\\', "\\5c")
            .replace('*', "\\2a")
            .replace('(', "\\28")
            .replace(')', "\\29")
            .replace('\0', "\\00")
    }

    fn account_filter(&self, username: &str) -> String {
        format!(
            "({}={})",
            self.config.account_attribute,
            Self::escape_ldap_value(username)
        )
    }
}

/// Read an attribute case-insensitively, concatenating multiple values.
fn attribute_value(attrs: &HashMap<String, Vec<String>>, name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, values)| values.concat())
        .filter(|value| !value.is_empty())
}

fn directory_attributes(
    attrs: &HashMap<String, Vec<String>>,
    account_attribute: &str,
) -> DirectoryAttributes {
    DirectoryAttributes {
        mail: attribute_value(attrs, MAIL),
        manager_ref: attribute_value(attrs, MANAGER),
        account_name: attribute_value(attrs, account_attribute),
        display_name: attribute_value(attrs, NAME),
    }
}

fn manager_entry(attrs: &HashMap<String, Vec<String>>) -> ManagerEntry {
    ManagerEntry {
        mail: attribute_value(attrs, MAIL),
        display_name: attribute_value(attrs, DISPLAY_NAME),
    }
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
    async fn bind(&self) -> PumResult<()> {
        let url = self.config.url();
        debug!(url = %url, "Connecting to LDAP server");

        // Referrals are not chased.
        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.connection_timeout_secs));

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                PumError::directory_query_with_source(
                    format!("Failed to connect to LDAP server at {}", url),
                    e,
                )
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let bind_dn = &self.config.bind_dn;
        let bind_password = self.config.bind_password.as_deref().unwrap_or("");

        debug!(bind_dn = %bind_dn, "Performing LDAP bind");

        let result = ldap.simple_bind(bind_dn, bind_password).await.map_err(|e| {
            PumError::directory_query_with_source(format!("LDAP bind failed for {}", bind_dn), e)
        })?;

        check_bind_result(result.rc, &result.text, bind_dn)?;

        *self.connection.write().await = Some(ldap);

        info!(host = %self.config.host, "LDAP session bound");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_account(&self, username: &str) -> PumResult<Option<DirectoryHit>> {
        let filter = self.account_filter(username);
        let attrs = vec![MAIL, MANAGER, self.config.account_attribute.as_str(), NAME];

        let entries = self
            .search(
                &self.config.deprovisioned_base_dn,
                &filter,
                attrs,
                MissingBase::Error,
            )
            .await?;

        Ok(entries.first().map(|attrs| {
            DirectoryHit::from(directory_attributes(
                attrs,
                &self.config.account_attribute,
            ))
        }))
    }

    #[instrument(skip(self))]
    async fn find_manager(&self, manager_ref: &str) -> PumResult<Option<ManagerEntry>> {
        let entries = self
            .search(
                manager_ref,
                "(cn=*)",
                vec![MAIL, DISPLAY_NAME],
                MissingBase::NotFound,
            )
            .await?;

        Ok(entries.first().map(manager_entry))
    }

    async fn unbind(&self) -> PumResult<()> {
        let mut guard = self.connection.write().await;
        if let Some(mut ldap) = guard.take() {
            ldap.unbind().await.map_err(|e| {
                PumError::directory_query_with_source("Error during LDAP unbind", e)
            })?;
            info!("LDAP session unbound");
        }
        Ok(())
    }
}

impl std::fmt::Debug for LdapDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDirectory")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: Vec<(&str, Vec<&str>)>) -> HashMap<String, Vec<String>> {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    fn test_directory() -> LdapDirectory {
        LdapDirectory::new(LdapDirectoryConfig::new("ldap.example.com", "service_acct")).unwrap()
    }

    #[test]
    fn test_escape_ldap_value() {
        assert_eq!(
            LdapDirectory::escape_ldap_value("a*b(c)d\\e"),
            "a\\2ab\\28c\\29d\\5ce"
        );
    }

    #[test]
    fn test_account_filter() {
        let directory = test_directory();
        assert_eq!(directory.account_filter("jsmith"), "(AccountName=jsmith)");
        assert_eq!(
            directory.account_filter("*)(objectClass=*"),
            "(AccountName=\\2a\\29\\28objectClass=\\2a)"
        );
    }

    #[test]
    fn test_attribute_value_is_case_insensitive() {
        let entry = attrs(vec![("Mail", vec!["jsmith@example.com"])]);
        assert_eq!(
            attribute_value(&entry, "mail"),
            Some("jsmith@example.com".to_string())
        );
    }

    #[test]
    fn test_attribute_value_concatenates_values() {
        let entry = attrs(vec![("name", vec!["Smith,", "John"])]);
        assert_eq!(attribute_value(&entry, "name"), Some("Smith,John".to_string()));
    }

    #[test]
    fn test_attribute_value_empty_is_missing() {
        let entry = attrs(vec![("mail", vec![])]);
        assert_eq!(attribute_value(&entry, "mail"), None);
    }

    #[test]
    fn test_complete_entry_classification() {
        let entry = attrs(vec![
            ("mail", vec!["jdoe@example.com"]),
            ("manager", vec!["CN=Boss,OU=Users"]),
            ("AccountName", vec!["jdoe"]),
            ("name", vec!["Doe,Jane"]),
        ]);
        let hit = DirectoryHit::from(directory_attributes(&entry, "AccountName"));
        assert!(hit.is_complete());
    }

    #[test]
    fn test_stripped_entry_classification() {
        let entry = attrs(vec![
            ("mail", vec!["jsmith@example.com"]),
            ("manager", vec!["CN=Boss"]),
            ("name", vec!["Smith,John"]),
        ]);
        let hit = DirectoryHit::from(directory_attributes(&entry, "AccountName"));
        assert_eq!(
            hit,
            DirectoryHit::Partial {
                mail: Some("jsmith@example.com".to_string()),
                manager_ref: Some("CN=Boss".to_string()),
                display_name: "Smith,John".to_string(),
            }
        );
    }

    #[test]
    fn test_manager_entry_reads_display_name() {
        let entry = attrs(vec![("displayname", vec!["Boss Person"])]);
        assert_eq!(
            manager_entry(&entry),
            ManagerEntry {
                mail: None,
                display_name: Some("Boss Person".to_string()),
            }
        );
    }

    #[test]
    fn test_bind_result_codes() {
        assert!(check_bind_result(0, "", "service_acct").is_ok());

        let err = check_bind_result(49, "80090308: LdapErr", "service_acct").unwrap_err();
        assert!(matches!(err, PumError::AuthenticationFailed { .. }));
        assert!(err.is_run_fatal());

        let err = check_bind_result(52, "unavailable", "service_acct").unwrap_err();
        assert!(matches!(err, PumError::DirectoryQuery { .. }));
        assert!(err.to_string().contains("code 52"));
    }

    #[test]
    fn test_search_success() {
        assert!(check_search_result(0, "", "OU=Disabled", MissingBase::Error).unwrap());
        assert!(check_search_result(0, "", "CN=Boss", MissingBase::NotFound).unwrap());
    }

    #[test]
    fn test_stale_manager_reference_is_not_found() {
        let found = check_search_result(32, "no such object", "CN=Gone", MissingBase::NotFound);
        assert!(!found.unwrap());
    }

    #[test]
    fn test_missing_account_base_is_an_error() {
        let err = check_search_result(
            32,
            "no such object",
            "OU=Accounts,OU=Disabled",
            MissingBase::Error,
        )
        .unwrap_err();
        assert!(matches!(err, PumError::DirectoryQuery { .. }));
        assert!(!err.is_run_fatal());
        assert!(err.to_string().contains("OU=Accounts,OU=Disabled"));
    }

    #[test]
    fn test_other_search_codes_are_errors() {
        for missing in [MissingBase::Error, MissingBase::NotFound] {
            let err = check_search_result(3, "time limit exceeded", "OU=Disabled", missing)
                .unwrap_err();
            assert!(matches!(err, PumError::DirectoryQuery { .. }));
            assert!(err.to_string().contains("code 3"));
        }
    }

    #[tokio::test]
    async fn test_lookup_before_bind_fails() {
        let directory = test_directory();
        let err = directory.find_account("jsmith").await.unwrap_err();
        assert!(matches!(err, PumError::DirectoryQuery { .. }));
    }

    #[tokio::test]
    async fn test_unbind_without_session_is_noop() {
        let directory = test_directory();
        assert!(directory.unbind().await.is_ok());
    }
}
