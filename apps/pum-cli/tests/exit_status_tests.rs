//! Mapping of run outcomes to exit codes.

use uuid::Uuid;

use pum_cli::{conclude, parse_mode, CliError};
use pum_core::{PumError, RunMode, RunSummary, ServerOutcome, ServerReport};

fn completed(server: &str) -> ServerOutcome {
    ServerOutcome::Completed(ServerReport {
        server: server.to_string(),
        server_name: server.to_string(),
        mode: RunMode::ReadOnly,
        departed: vec![],
        inconclusive: vec![],
        notified: vec![],
        removed: vec![],
        removal_error: None,
    })
}

fn failed(server: &str, error: PumError) -> ServerOutcome {
    ServerOutcome::Failed {
        server: server.to_string(),
        error,
    }
}

fn summary(servers: Vec<ServerOutcome>) -> RunSummary {
    RunSummary {
        run_id: Uuid::new_v4(),
        mode: RunMode::ReadOnly,
        servers,
    }
}

#[test]
fn test_all_servers_completed() {
    assert!(conclude(summary(vec![completed("a:1666"), completed("b:1666")])).is_ok());
}

#[test]
fn test_failed_server_exits_one() {
    let err = conclude(summary(vec![
        completed("a:1666"),
        failed("b:1666", PumError::resource_auth("Password invalid.")),
    ]))
    .unwrap_err();

    assert!(matches!(err, CliError::ServersFailed { failed: 1, total: 2 }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_run_fatal_error_decides_exit_code() {
    let err = conclude(summary(vec![failed(
        "a:1666",
        PumError::directory_auth("invalid credentials"),
    )]))
    .unwrap_err();

    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_invalid_mode_exits_three() {
    let err = parse_mode("x").unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert_eq!(parse_mode("m").unwrap(), RunMode::Modify);
    assert_eq!(parse_mode("r").unwrap(), RunMode::ReadOnly);
}
