//! Outbound email boundary.
//!
//! Notification dispatch goes through the [`EmailSender`] trait; the SMTP
//! transport is the production implementation and a no-op sender stands in
//! for it in tests and mail-less deployments.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use crate::config::MailConfig;
use crate::errors::{Error, Result};

/// A rendered outbound message.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Outbound mail dispatch boundary.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

/// SMTP-backed sender.
pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailService {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|err| Error::config(format!("Invalid mail from address: {}", err)))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self { transport: builder.build(), from })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailService {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|err| Error::mail(format!("Invalid recipient address: {}", err)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html_body)
            .map_err(|err| Error::mail(format!("Failed to build message: {}", err)))?;

        self.transport
            .send(email)
            .await
            .map_err(|err| Error::mail(format!("SMTP send failed: {}", err)))?;

        Ok(())
    }
}

/// Sender that drops messages on the floor, logging them at info level.
#[derive(Debug, Clone, Default)]
pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        info!(to = %message.to, subject = %message.subject, "Mail dispatch disabled, dropping message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smtp_service_rejects_malformed_from_address() {
        let config =
            MailConfig { from_address: "not an address".to_string(), ..Default::default() };
        assert!(SmtpEmailService::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn smtp_service_accepts_default_config() {
        assert!(SmtpEmailService::from_config(&MailConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn noop_sender_accepts_everything() {
        let sender = NoopEmailSender;
        let result = sender
            .send(EmailMessage {
                to: "user@example.com".to_string(),
                subject: "welcome".to_string(),
                html_body: "<p>hi</p>".to_string(),
            })
            .await;
        assert!(result.is_ok());
    }
}
