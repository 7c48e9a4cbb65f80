//! Outgoing email.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tokio::sync::RwLock;

use crate::{IntegrationError, Result};

/// An email ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

impl EmailMessage {
    /// Creates an HTML email to a single recipient.
    pub fn html(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: vec![to.into()],
            subject: subject.into(),
            body: body.into(),
            is_html: true,
        }
    }
}

/// Delivers email messages.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

/// SMTP connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from_email: String,
    pub from_name: String,
    pub enable_tls: bool,
    /// Authentication is used only when both username and password are set.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1025,
            from_email: "noreply@inventory.com".to_string(),
            from_name: "Inventory Management System".to_string(),
            enable_tls: false,
            username: None,
            password: None,
        }
    }
}

/// Sends email through an SMTP relay.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from = Mailbox::new(
            Some(config.from_name.clone()),
            config
                .from_email
                .parse()
                .map_err(|e| IntegrationError::Address(format!("{}: {e}", config.from_email)))?,
        );

        let mut builder = if config.enable_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            // Plain connection for local relays such as Mailpit.
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &EmailMessage) -> Result<Message> {
        if email.to.is_empty() {
            return Err(IntegrationError::Address("no recipients".to_string()));
        }

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(&email.subject);
        for recipient in &email.to {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| IntegrationError::Address(format!("{recipient}: {e}")))?;
            builder = builder.to(mailbox);
        }

        let content_type = if email.is_html {
            ContentType::TEXT_HTML
        } else {
            ContentType::TEXT_PLAIN
        };
        Ok(builder.header(content_type).body(email.body.clone())?)
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    #[tracing::instrument(skip(self, message), fields(subject = %message.subject))]
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let email = self.build_message(&message)?;
        let result = self.transport.send(email).await.map(|_| ()).map_err(IntegrationError::from);
        crate::http::record_call("smtp", &result);
        result?;

        tracing::info!(
            recipients = %message.to.join(", "),
            subject = %message.subject,
            "email sent"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct InMemoryEmailState {
    sent: Vec<EmailMessage>,
    fail_on_send: bool,
}

/// In-memory email sender for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailSender {
    state: Arc<RwLock<InMemoryEmailState>>,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_send(&self, fail: bool) {
        self.state.write().await.fail_on_send = fail;
    }

    /// Messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.state.read().await.sent.clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_send {
            return Err(IntegrationError::Unavailable("email sender".to_string()));
        }
        state.sent.push(message);
        Ok(())
    }
}
