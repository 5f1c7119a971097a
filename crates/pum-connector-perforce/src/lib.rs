//! # Perforce Connector
//!
//! Drives the `p4` command-line client to list users, remove departed users
//! together with their client workspaces, and manage login tickets. Every
//! command runs with `-p <server> -u <user>`; listings use `-ztag` output.

pub mod config;
pub mod connector;
pub mod runner;
pub mod ztag;

// Re-exports
pub use config::PerforceConfig;
pub use connector::{PerforceConnector, PerforceSession};
pub use runner::{P4Invocation, P4Output, P4Runner, ProcessRunner};
