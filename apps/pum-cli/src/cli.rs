use clap::Parser;

/// Find Perforce users whose directory account is deprovisioned, notify their
/// managers and remove them.
#[derive(Debug, Parser)]
#[command(name = "pum")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run mode: 'r' (read-only, report only) or 'm' (modify, notify and remove)
    #[arg(short, long, default_value = "r")]
    pub mode: String,

    /// Perforce server to process, e.g. ssl:perforce:1666. Repeatable.
    /// Overrides PUM_SERVERS.
    #[arg(short, long = "server", value_name = "PORT")]
    pub servers: Vec<String>,
}
