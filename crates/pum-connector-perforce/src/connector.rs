//! Perforce connector and per-server session

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use tracing::{debug, info, instrument, warn};

use pum_core::{PumError, PumResult, ResourceConnector, ResourceSession, ResourceUser};

use crate::config::PerforceConfig;
use crate::runner::{P4Invocation, P4Output, P4Runner, ProcessRunner};
use crate::ztag::{self, ZtagRecord};

/// Format used for the last-access column.
const ACCESS_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Opens ticket-authenticated sessions against Perforce servers.
pub struct PerforceConnector {
    config: PerforceConfig,
    runner: Arc<dyn P4Runner>,
}

impl PerforceConnector {
    /// Create a connector that runs the configured `p4` executable.
    pub fn new(config: PerforceConfig) -> PumResult<Self> {
        config.validate()?;
        let runner = Arc::new(ProcessRunner::new(config.p4_bin.clone()));
        Ok(Self { config, runner })
    }

    /// Create a connector with a custom command runner.
    pub fn with_runner(config: PerforceConfig, runner: Arc<dyn P4Runner>) -> PumResult<Self> {
        config.validate()?;
        Ok(Self { config, runner })
    }
}

#[async_trait]
impl ResourceConnector for PerforceConnector {
    #[instrument(skip(self))]
    async fn login(&self, server: &str) -> PumResult<Box<dyn ResourceSession>> {
        let invocation = match &self.config.password {
            Some(password) => {
                P4Invocation::new(server, &self.config.user, &["login"]).with_stdin(password)
            }
            None => P4Invocation::new(server, &self.config.user, &["login", "-s"]),
        };

        let output = self.runner.run(&invocation).await?;
        if !output.success {
            return Err(PumError::resource_auth(format!(
                "login to {} as {} failed: {}",
                server,
                self.config.user,
                output.stderr.trim()
            )));
        }

        info!(server = %server, user = %self.config.user, "Perforce login succeeded");

        Ok(Box::new(PerforceSession {
            port: server.to_string(),
            user: self.config.user.clone(),
            runner: Arc::clone(&self.runner),
            connected: true,
        }))
    }
}

/// A logged-in session on one Perforce server.
pub struct PerforceSession {
    port: String,
    user: String,
    runner: Arc<dyn P4Runner>,
    connected: bool,
}

impl PerforceSession {
    async fn run(&self, invocation: P4Invocation) -> PumResult<P4Output> {
        if !self.connected {
            return Err(PumError::resource(format!(
                "session on {} is disconnected",
                self.port
            )));
        }
        self.runner.run(&invocation).await?.into_result(&invocation)
    }

    async fn run_tagged(&self, args: &[&str]) -> PumResult<Vec<ZtagRecord>> {
        let output = self
            .run(P4Invocation::new(&self.port, &self.user, args).tagged())
            .await?;
        Ok(ztag::parse(&output.stdout))
    }

    async fn run_plain(&self, args: &[&str]) -> PumResult<()> {
        self.run(P4Invocation::new(&self.port, &self.user, args))
            .await
            .map(|_| ())
    }
}

/// Render an epoch-seconds access time, keeping unparseable values verbatim.
fn format_access(raw: &str) -> String {
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|ts| ts.format(ACCESS_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn user_from_record(mut record: ZtagRecord) -> Option<ResourceUser> {
    let username = record.remove("User")?;
    Some(ResourceUser {
        username,
        full_name: record.remove("FullName").unwrap_or_default(),
        last_access: record
            .get("Access")
            .map(|raw| format_access(raw))
            .unwrap_or_default(),
        email: record.remove("Email").unwrap_or_default(),
    })
}

#[async_trait]
impl ResourceSession for PerforceSession {
    async fn users(&mut self) -> PumResult<Vec<ResourceUser>> {
        let records = self.run_tagged(&["users"]).await?;
        let total = records.len();

        let users: Vec<ResourceUser> = records.into_iter().filter_map(user_from_record).collect();
        if users.len() != total {
            warn!(
                server = %self.port,
                skipped = total - users.len(),
                "Skipped user records without a User field"
            );
        }

        Ok(users)
    }

    /// Delete the user's client workspaces, then the user.
    #[instrument(skip(self), fields(server = %self.port))]
    async fn remove_user(&mut self, username: &str) -> PumResult<()> {
        let clients: Vec<String> = self
            .run_tagged(&["clients", "-u", username])
            .await?
            .into_iter()
            .filter_map(|mut record| record.remove("client"))
            .collect();

        for client in &clients {
            self.run_plain(&["client", "-d", "-f", client.as_str()]).await?;
            debug!(client = %client, "Deleted client workspace");
        }

        self.run_plain(&["user", "-d", "-f", username]).await?;
        info!(clients = clients.len(), "Deleted Perforce user");
        Ok(())
    }

    async fn server_name(&mut self) -> PumResult<String> {
        let mut records = self.run_tagged(&["info"]).await?;
        let name = records.first_mut().and_then(|info| {
            info.remove("serverID")
                .or_else(|| info.remove("serverAddress"))
                .filter(|name| !name.is_empty())
        });
        Ok(name.unwrap_or_else(|| self.port.clone()))
    }

    async fn disconnect(&mut self) -> PumResult<()> {
        if !self.connected {
            return Ok(());
        }
        let result = self.run_plain(&["logout"]).await;
        self.connected = false;
        result?;
        info!(server = %self.port, "Perforce session logged out");
        Ok(())
    }
}
