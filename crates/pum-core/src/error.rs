//! Error types for the reconciliation workflow
//!
//! Errors are classified by scope: some abort the whole run, the rest abort
//! at most the current server and are decided by the run loop.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error that can occur while reconciling or removing accounts.
#[derive(Debug, Error)]
pub enum PumError {
    /// Credentials were rejected by the directory or the resource service.
    #[error("authentication failed for {system}: {message}")]
    AuthenticationFailed { system: String, message: String },

    /// A directory search failed at the protocol level.
    #[error("directory query failed: {message}")]
    DirectoryQuery {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A call into the resource-management service failed.
    #[error("resource service error: {message}")]
    ResourceService {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The audit record could not be written.
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A notification could not be delivered.
    #[error("notification error: {message}")]
    Notification {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Configuration is invalid (bad run mode, missing settings).
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl PumError {
    /// Whether this error must stop the whole run rather than just the
    /// current server.
    pub fn is_run_fatal(&self) -> bool {
        match self {
            PumError::AuthenticationFailed { system, .. } => system == DIRECTORY_SYSTEM,
            PumError::InvalidConfiguration { .. } => true,
            _ => false,
        }
    }

    /// Get an error code for classification in logs and reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            PumError::AuthenticationFailed { .. } => "AUTH_FAILED",
            PumError::DirectoryQuery { .. } => "DIRECTORY_QUERY_FAILED",
            PumError::ResourceService { .. } => "RESOURCE_SERVICE_FAILED",
            PumError::Persistence { .. } => "PERSISTENCE_FAILED",
            PumError::Notification { .. } => "NOTIFICATION_FAILED",
            PumError::InvalidConfiguration { .. } => "INVALID_CONFIG",
        }
    }

    // Convenience constructors

    /// Create a directory authentication error.
    pub fn directory_auth(message: impl Into<String>) -> Self {
        PumError::AuthenticationFailed {
            system: DIRECTORY_SYSTEM.to_string(),
            message: message.into(),
        }
    }

    /// Create a resource-service authentication error.
    pub fn resource_auth(message: impl Into<String>) -> Self {
        PumError::AuthenticationFailed {
            system: RESOURCE_SYSTEM.to_string(),
            message: message.into(),
        }
    }

    /// Create a directory query error.
    pub fn directory_query(message: impl Into<String>) -> Self {
        PumError::DirectoryQuery {
            message: message.into(),
            source: None,
        }
    }

    /// Create a directory query error with source.
    pub fn directory_query_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PumError::DirectoryQuery {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a resource service error.
    pub fn resource(message: impl Into<String>) -> Self {
        PumError::ResourceService {
            message: message.into(),
            source: None,
        }
    }

    /// Create a resource service error with source.
    pub fn resource_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PumError::ResourceService {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a persistence error with source.
    pub fn persistence_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PumError::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a notification error.
    pub fn notification(message: impl Into<String>) -> Self {
        PumError::Notification {
            message: message.into(),
            source: None,
        }
    }

    /// Create a notification error with source.
    pub fn notification_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PumError::Notification {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        PumError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// System label used for directory authentication failures.
pub const DIRECTORY_SYSTEM: &str = "directory";

/// System label used for resource-service authentication failures.
pub const RESOURCE_SYSTEM: &str = "perforce";

/// Result type for workflow operations.
pub type PumResult<T> = Result<T, PumError>;
