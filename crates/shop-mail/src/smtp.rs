//! # SMTP Transport
//!
//! `Mailer` implementation on top of lettre's async SMTP transport.

use crate::config::MailConfig;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use shop_core::{Email, EmailBody, Mailer, ShopError, ShopResult};
use tracing::{debug, instrument};

/// Sends mail through an authenticated SMTP relay (Gmail by default)
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

fn parse_mailbox(address: &str) -> ShopResult<Mailbox> {
    address
        .parse()
        .map_err(|e| ShopError::Mail(format!("Invalid address {:?}: {}", address, e)))
}

impl SmtpMailer {
    /// Build the transport. No connection is made until the first send.
    pub fn new(config: &MailConfig) -> ShopResult<Self> {
        let builder = if config.uses_starttls() {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        }
        .map_err(|e| ShopError::Configuration(format!("Invalid SMTP relay: {}", e)))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .build();

        let from = config
            .user
            .parse()
            .map_err(|e| ShopError::Configuration(format!("EMAIL_USER is not an address: {}", e)))?;

        Ok(Self { transport, from })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        Self::new(&MailConfig::from_env()?)
    }

    fn build_message(&self, email: &Email) -> ShopResult<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.as_str());

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        let (content_type, content) = match &email.body {
            EmailBody::Html(html) => (ContentType::TEXT_HTML, html.clone()),
            EmailBody::Text(text) => (ContentType::TEXT_PLAIN, text.clone()),
        };

        builder
            .header(content_type)
            .body(content)
            .map_err(|e| ShopError::Mail(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, email), fields(subject = %email.subject))]
    async fn send(&self, email: &Email) -> ShopResult<()> {
        let message = self.build_message(email)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| ShopError::Mail(e.to_string()))?;

        debug!("SMTP accepted message: code={}", response.code());
        Ok(())
    }
}
