//! CLI error types and exit codes

use thiserror::Error;

use pum_core::PumError;

use crate::config::ConfigError;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error, or servers failed during the run
/// - 2: Authentication failed
/// - 3: Invalid configuration or run mode
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid run mode '{0}'. Use 'r' (read-only) or 'm' (modify).")]
    InvalidMode(String),

    #[error(transparent)]
    Run(#[from] PumError),

    #[error("{failed} of {total} servers failed")]
    ServersFailed { failed: usize, total: usize },

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::InvalidMode(_) => 3,
            CliError::Run(e) => match e {
                PumError::AuthenticationFailed { .. } => 2,
                PumError::InvalidConfiguration { .. } => 3,
                _ => 1,
            },
            CliError::ServersFailed { .. } => 1,
            CliError::Io(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::InvalidMode("x".into()).exit_code(), 3);
        assert_eq!(
            CliError::Config(ConfigError::MissingVar("LDAP_HOST".into())).exit_code(),
            3
        );
        assert_eq!(
            CliError::Run(PumError::directory_auth("invalid credentials")).exit_code(),
            2
        );
        assert_eq!(
            CliError::Run(PumError::invalid_configuration("bad")).exit_code(),
            3
        );
        assert_eq!(CliError::Run(PumError::resource("p4 down")).exit_code(), 1);
        assert_eq!(
            CliError::ServersFailed {
                failed: 1,
                total: 3
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CliError::InvalidMode("x".into()).to_string(),
            "Invalid run mode 'x'. Use 'r' (read-only) or 'm' (modify)."
        );
        assert_eq!(
            CliError::ServersFailed {
                failed: 2,
                total: 3
            }
            .to_string(),
            "2 of 3 servers failed"
        );
    }
}
