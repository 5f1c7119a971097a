//! # PUM Core
//!
//! Reconciles Perforce user accounts against the deprovisioned scope of an
//! LDAP directory, enriches every departed account with manager contact
//! details, and optionally removes the account after notifying the manager.
//!
//! ## Flow
//!
//! For each server, [`ServerRunController`] logs in, fetches users, runs the
//! [`ReconciliationEngine`], applies the [`RemovalWorkflow`] in modify mode,
//! then writes the audit record and the administrator summary.
//!
//! The directory, Perforce, audit store and mail relay are reached only
//! through the traits in [`traits`].

pub mod controller;
pub mod error;
pub mod merge;
pub mod reconcile;
pub mod removal;
pub mod report;
pub mod resolver;
pub mod traits;
pub mod types;

// Re-exports
pub use controller::{ServerRun, ServerRunController};
pub use error::{PumError, PumResult};
pub use merge::RecordMerger;
pub use reconcile::ReconciliationEngine;
pub use removal::RemovalWorkflow;
pub use report::{
    InconclusiveLookup, ReconciliationOutcome, RemovalFailure, RemovalReport, RunSummary,
    ServerOutcome, ServerReport,
};
pub use resolver::{ManagerContact, ManagerResolver};
pub use traits::{AuditSink, DirectoryClient, Notifier, ResourceConnector, ResourceSession};
pub use types::{
    DepartedUser, DirectoryAttributes, DirectoryHit, ManagerEntry, ResourceUser, RunMode,
};
