//! SMTP implementation of [`NotificationService`] using Lettre.

use consulta_common::services::{BoxFuture, NotificationResult, NotificationService};
use consulta_common::ConsultaError;
use consulta_config::MailConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address {address}: {message}")]
    Address { address: String, message: String },
    #[error("Failed to build email: {0}")]
    Build(String),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl From<MailError> for ConsultaError {
    fn from(err: MailError) -> Self {
        ConsultaError::ProviderError {
            service_name: "SMTP".to_string(),
            message: err.to_string(),
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        message: e.to_string(),
    })
}

/// Builds a single-recipient message from `from`.
pub fn build_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    body: &str,
    is_html: bool,
) -> Result<Message, MailError> {
    let content_type = if is_html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };

    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(to)?)
        .subject(subject)
        .header(content_type)
        .body(body.to_string())
        .map_err(|e| MailError::Build(e.to_string()))
}

/// Sends mail through an authenticated SMTP relay (STARTTLS/TLS).
#[derive(Clone)]
pub struct SmtpNotificationService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotificationService {
    /// No connection is opened until the first message is sent.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let from = parse_mailbox(&format!("{} <{}>", config.from_name, config.from_email))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        debug!(
            "SMTP relay {}:{} configured for {}",
            config.smtp_server, config.smtp_port, from
        );
        Ok(Self { transport, from })
    }

    pub fn sender(&self) -> &Mailbox {
        &self.from
    }
}

impl NotificationService for SmtpNotificationService {
    type Error = MailError;

    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let message = build_message(&self.from, to, subject, body, is_html);
        let to = to.to_string();

        Box::pin(async move {
            let response = self.transport.send(message?).await?;
            info!("Email sent to {}", to);

            let result = NotificationResult {
                message_id: response.message().next().map(str::to_string),
                status: response.code().to_string(),
            };
            Ok(result)
        })
    }
}
