//! Email notifications
//!
//! Managers of departed users are told before an account is removed and
//! administrators receive a summary per processed server.

pub mod config;
pub mod email;
pub mod templates;

pub use config::NotifyConfig;
pub use email::SmtpNotifier;
pub use templates::EmailContent;
