//! # LDAP Directory Client
//!
//! Looks up accounts in the deprovisioned container of an LDAP/Active
//! Directory tree, and resolves manager references to contact details.
//!
//! ## Example
//!
//! ```ignore
//! use pum_connector_ldap::{LdapDirectory, LdapDirectoryConfig};
//! use pum_core::DirectoryClient;
//!
//! let config = LdapDirectoryConfig::new("ldap.example.com", "service_acct")
//!     .with_password("secret")
//!     .with_deprovisioned_base_dn("OU=Accounts,OU=Disabled");
//!
//! let directory = LdapDirectory::new(config)?;
//! directory.bind().await?;
//! let hit = directory.find_account("jsmith").await?;
//! ```

pub mod config;
pub mod connector;

// Re-exports
pub use config::LdapDirectoryConfig;
pub use connector::LdapDirectory;
