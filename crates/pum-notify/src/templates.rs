//! Plain-text message bodies

use pum_core::{DepartedUser, RunMode, ServerReport};

/// Subject and body of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

/// Message to a departed user's manager.
pub fn manager_message(user: &DepartedUser, server: &str) -> EmailContent {
    let subject = format!("Perforce access removed for {}", user.name);
    let body = format!(
        "Hello {manager},\n\n\
         {name} ({username}) no longer has an active account in the corporate \
         directory, so their Perforce account on {server} is being removed \
         together with their client workspaces.\n\n\
         Last access: {last_access}\n\n\
         If this user still needs access, please contact the Perforce \
         administrators.\n",
        manager = user.manager,
        name = user.name,
        username = user.username,
        server = server,
        last_access = user.last_access,
    );
    EmailContent { subject, body }
}

/// Per-server summary for the administrator list.
pub fn admin_summary(report: &ServerReport) -> EmailContent {
    let subject = format!(
        "Perforce departed users on {}: {} found",
        report.server_name,
        report.departed.len()
    );

    let mode = match report.mode {
        RunMode::ReadOnly => "read-only, no accounts were changed",
        RunMode::Modify => "modify",
    };
    let mut lines = vec![
        format!("Server: {} ({})", report.server_name, report.server),
        format!("Mode: {mode}"),
        String::new(),
    ];

    if report.departed.is_empty() {
        lines.push("No departed users found.".to_string());
    } else {
        lines.push("Departed users:".to_string());
        lines.extend(report.departed.iter().map(|user| {
            let removed = if report.removed.contains(&user.username) {
                " [removed]"
            } else {
                ""
            };
            format!(
                "  {} ({}) - manager: {} <{}>{}",
                user.name, user.username, user.manager, user.manager_email, removed
            )
        }));
    }

    if let Some(error) = &report.removal_error {
        lines.push(String::new());
        lines.push(format!("Removal stopped early: {error}"));
    }

    if !report.inconclusive.is_empty() {
        lines.push(String::new());
        lines.push("Directory lookups that failed (not removed):".to_string());
        lines.extend(
            report
                .inconclusive
                .iter()
                .map(|lookup| format!("  {}: {}", lookup.username, lookup.reason)),
        );
    }

    let mut body = lines.join("\n");
    body.push('\n');
    EmailContent { subject, body }
}
