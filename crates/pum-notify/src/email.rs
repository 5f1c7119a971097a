//! SMTP delivery
//!
//! Messages go through an unauthenticated relay.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use pum_core::{DepartedUser, Notifier, PumError, PumResult, ServerReport};

use crate::config::NotifyConfig;
use crate::templates::{self, EmailContent};

/// Sends notifications through an SMTP relay.
pub struct SmtpNotifier {
    from: Mailbox,
    admins: Vec<Mailbox>,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(config: NotifyConfig) -> PumResult<Self> {
        config.validate()?;

        let sender = parse_address(&config.from_email)?;
        let from = Mailbox::new(Some(config.from_name.clone()), sender.email);
        let admins = config
            .admin_recipients
            .iter()
            .map(|addr| parse_address(addr))
            .collect::<PumResult<Vec<_>>>()?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .build();

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            admins = admins.len(),
            "SMTP notifier configured"
        );

        Ok(Self {
            from,
            admins,
            mailer,
        })
    }

    async fn send(&self, message: Message) -> PumResult<()> {
        self.mailer
            .send(message)
            .await
            .map_err(|e| PumError::notification_with_source("SMTP delivery failed", e))?;
        Ok(())
    }
}

fn parse_address(addr: &str) -> PumResult<Mailbox> {
    addr.trim().parse::<Mailbox>().map_err(|e| {
        PumError::notification_with_source(format!("invalid email address '{addr}'"), e)
    })
}

/// Assemble a plain-text message.
pub fn build_message(from: &Mailbox, to: &[Mailbox], content: EmailContent) -> PumResult<Message> {
    let mut builder = Message::builder()
        .from(from.clone())
        .subject(content.subject)
        .header(ContentType::TEXT_PLAIN);
    for recipient in to {
        builder = builder.to(recipient.clone());
    }
    builder
        .body(content.body)
        .map_err(|e| PumError::notification_with_source("failed to build message", e))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn notify_manager(&self, user: &DepartedUser, server: &str) -> PumResult<()> {
        let to = parse_address(&user.manager_email)?;
        let message = build_message(
            &self.from,
            std::slice::from_ref(&to),
            templates::manager_message(user, server),
        )?;
        self.send(message).await?;
        info!(manager_email = %user.manager_email, "Manager notified");
        Ok(())
    }

    #[instrument(skip(self, report), fields(server = %report.server))]
    async fn notify_admins(&self, report: &ServerReport) -> PumResult<()> {
        let message = build_message(&self.from, &self.admins, templates::admin_summary(report))?;
        self.send(message).await?;
        info!(recipients = self.admins.len(), "Administrator summary sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> EmailContent {
        EmailContent {
            subject: "Perforce access removed for John Smith".to_string(),
            body: "Hello".to_string(),
        }
    }

    #[test]
    fn test_build_message_headers() {
        let from = parse_address("pum@example.com").unwrap();
        let to = vec![
            parse_address("admin1@example.com").unwrap(),
            parse_address("admin2@example.com").unwrap(),
        ];

        let message = build_message(&from, &to, content()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: pum@example.com"));
        assert!(raw.contains("admin1@example.com"));
        assert!(raw.contains("admin2@example.com"));
        assert!(raw.contains("Subject: Perforce access removed for John Smith"));
    }

    #[test]
    fn test_invalid_address_is_notification_error() {
        let err = parse_address("No manager email").unwrap_err();
        assert!(matches!(err, PumError::Notification { .. }));
        assert!(!err.is_run_fatal());
    }

    #[test]
    fn test_new_rejects_empty_admin_list() {
        let config = NotifyConfig::new("smtp.example.com", "pum@example.com", vec![]);
        assert!(matches!(
            SmtpNotifier::new(config),
            Err(PumError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_new_rejects_bad_admin_address() {
        let config = NotifyConfig::new(
            "smtp.example.com",
            "pum@example.com",
            vec!["not an address".to_string()],
        );
        assert!(SmtpNotifier::new(config).is_err());
    }
}
