//! In-memory fakes shared by the workflow integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pum_core::{
    AuditSink, DepartedUser, DirectoryClient, DirectoryHit, ManagerEntry, Notifier, PumError,
    PumResult, ResourceConnector, ResourceSession, ResourceUser, ServerReport,
};

/// Ordered log of every collaborator call, shared by all fakes.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn user(username: &str, full_name: &str, email: &str) -> ResourceUser {
    ResourceUser::new(username, full_name, "2021/01/01 00:00:00", email)
}

pub fn complete_hit(mail: &str, manager_ref: &str, account: &str, name: &str) -> DirectoryHit {
    DirectoryHit::Complete {
        mail: mail.to_string(),
        manager_ref: manager_ref.to_string(),
        account_name: account.to_string(),
        display_name: name.to_string(),
    }
}

pub fn partial_hit(mail: Option<&str>, manager_ref: Option<&str>, name: &str) -> DirectoryHit {
    DirectoryHit::Partial {
        mail: mail.map(String::from),
        manager_ref: manager_ref.map(String::from),
        display_name: name.to_string(),
    }
}

pub fn manager(mail: Option<&str>, name: Option<&str>) -> ManagerEntry {
    ManagerEntry {
        mail: mail.map(String::from),
        display_name: name.map(String::from),
    }
}

enum Lookup {
    Hit(DirectoryHit),
    Error(String),
}

/// Directory with a fixed set of deprovisioned accounts and managers.
pub struct FakeDirectory {
    log: EventLog,
    accounts: HashMap<String, Lookup>,
    managers: HashMap<String, ManagerEntry>,
    failing_managers: HashSet<String>,
    reject_bind: bool,
    bound: Mutex<bool>,
}

impl FakeDirectory {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            accounts: HashMap::new(),
            managers: HashMap::new(),
            failing_managers: HashSet::new(),
            reject_bind: false,
            bound: Mutex::new(false),
        }
    }

    pub fn with_account(mut self, username: &str, hit: DirectoryHit) -> Self {
        self.accounts.insert(username.to_string(), Lookup::Hit(hit));
        self
    }

    pub fn with_failing_account(mut self, username: &str, message: &str) -> Self {
        self.accounts
            .insert(username.to_string(), Lookup::Error(message.to_string()));
        self
    }

    pub fn with_manager(mut self, manager_ref: &str, entry: ManagerEntry) -> Self {
        self.managers.insert(manager_ref.to_string(), entry);
        self
    }

    pub fn with_failing_manager(mut self, manager_ref: &str) -> Self {
        self.failing_managers.insert(manager_ref.to_string());
        self
    }

    pub fn rejecting_bind(mut self) -> Self {
        self.reject_bind = true;
        self
    }

    fn push(&self, event: String) {
        self.log.lock().unwrap().push(event);
    }

    fn ensure_bound(&self) -> PumResult<()> {
        if *self.bound.lock().unwrap() {
            Ok(())
        } else {
            Err(PumError::directory_query("not bound"))
        }
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn bind(&self) -> PumResult<()> {
        self.push("bind".to_string());
        if self.reject_bind {
            return Err(PumError::directory_auth("invalid credentials"));
        }
        *self.bound.lock().unwrap() = true;
        Ok(())
    }

    async fn find_account(&self, username: &str) -> PumResult<Option<DirectoryHit>> {
        self.ensure_bound()?;
        self.push(format!("find_account:{username}"));
        match self.accounts.get(username) {
            Some(Lookup::Hit(hit)) => Ok(Some(hit.clone())),
            Some(Lookup::Error(message)) => Err(PumError::directory_query(message.clone())),
            None => Ok(None),
        }
    }

    async fn find_manager(&self, manager_ref: &str) -> PumResult<Option<ManagerEntry>> {
        self.ensure_bound()?;
        self.push(format!("find_manager:{manager_ref}"));
        if self.failing_managers.contains(manager_ref) {
            return Err(PumError::directory_query("manager search failed"));
        }
        Ok(self.managers.get(manager_ref).cloned())
    }

    async fn unbind(&self) -> PumResult<()> {
        self.push("unbind".to_string());
        *self.bound.lock().unwrap() = false;
        Ok(())
    }
}

/// Perforce stand-in holding a user list per server.
pub struct FakeConnector {
    log: EventLog,
    servers: HashMap<String, Vec<ResourceUser>>,
    login_failures: HashSet<String>,
    remove_failures: HashSet<String>,
}

impl FakeConnector {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            servers: HashMap::new(),
            login_failures: HashSet::new(),
            remove_failures: HashSet::new(),
        }
    }

    pub fn with_server(mut self, server: &str, users: Vec<ResourceUser>) -> Self {
        self.servers.insert(server.to_string(), users);
        self
    }

    pub fn failing_login(mut self, server: &str) -> Self {
        self.login_failures.insert(server.to_string());
        self
    }

    pub fn failing_removal(mut self, username: &str) -> Self {
        self.remove_failures.insert(username.to_string());
        self
    }
}

#[async_trait]
impl ResourceConnector for FakeConnector {
    async fn login(&self, server: &str) -> PumResult<Box<dyn ResourceSession>> {
        self.log.lock().unwrap().push(format!("login:{server}"));
        if self.login_failures.contains(server) {
            return Err(PumError::resource_auth(format!("login to {server} rejected")));
        }
        Ok(Box::new(FakeSession {
            log: Arc::clone(&self.log),
            server: server.to_string(),
            users: self.servers.get(server).cloned().unwrap_or_default(),
            remove_failures: self.remove_failures.clone(),
        }))
    }
}

struct FakeSession {
    log: EventLog,
    server: String,
    users: Vec<ResourceUser>,
    remove_failures: HashSet<String>,
}

#[async_trait]
impl ResourceSession for FakeSession {
    async fn users(&mut self) -> PumResult<Vec<ResourceUser>> {
        Ok(self.users.clone())
    }

    async fn remove_user(&mut self, username: &str) -> PumResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("remove:{}:{username}", self.server));
        if self.remove_failures.contains(username) {
            return Err(PumError::resource(format!("cannot delete {username}")));
        }
        Ok(())
    }

    async fn server_name(&mut self) -> PumResult<String> {
        Ok(format!("{}-name", self.server))
    }

    async fn disconnect(&mut self) -> PumResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("disconnect:{}", self.server));
        Ok(())
    }
}

/// Captures every audit record in memory.
pub struct RecordingAudit {
    log: EventLog,
    pub records: Mutex<Vec<(String, Vec<DepartedUser>)>>,
}

impl RecordingAudit {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            records: Mutex::new(Vec::new()),
        }
    }
}

impl AuditSink for RecordingAudit {
    fn record(&self, server: &str, departed: &[DepartedUser]) -> PumResult<()> {
        self.log.lock().unwrap().push(format!("audit:{server}"));
        self.records
            .lock()
            .unwrap()
            .push((server.to_string(), departed.to_vec()));
        Ok(())
    }
}

/// Captures notifications; can be told to fail manager messages.
pub struct RecordingNotifier {
    log: EventLog,
    fail_managers: bool,
    pub managers: Mutex<Vec<(String, String)>>,
    pub admins: Mutex<Vec<ServerReport>>,
}

impl RecordingNotifier {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_managers: false,
            managers: Mutex::new(Vec::new()),
            admins: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_managers(mut self) -> Self {
        self.fail_managers = true;
        self
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_manager(&self, user: &DepartedUser, server: &str) -> PumResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("notify:{server}:{}", user.username));
        if self.fail_managers {
            return Err(PumError::notification("relay refused"));
        }
        self.managers
            .lock()
            .unwrap()
            .push((user.username.clone(), server.to_string()));
        Ok(())
    }

    async fn notify_admins(&self, report: &ServerReport) -> PumResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("admins:{}", report.server));
        self.admins.lock().unwrap().push(report.clone());
        Ok(())
    }
}
