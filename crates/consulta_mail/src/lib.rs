//! Outgoing mail for Consulta: the SMTP implementation of the notification provider.

pub mod service;

pub use service::{build_message, MailError, SmtpNotificationService};
