// Mail transports behind the `Mailer` port

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::info;

use backend_domain::ports::Mailer;
use backend_domain::{MailConfig, MailTransport, OutboundEmail};

/// Picks the transport named in config.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    let mailer: Arc<dyn Mailer> = match config.transport {
        MailTransport::Log => Arc::new(LogMailer),
        MailTransport::Smtp => Arc::new(SmtpMailer::new(config)?),
        MailTransport::Webhook => Arc::new(WebhookMailer::new(config)?),
    };
    Ok(mailer)
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| anyhow!("smtp_host is not configured"))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .with_context(|| format!("invalid SMTP relay '{host}'"))?
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_seconds)));
        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn transport_name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let message = Message::builder()
            .from(self.from.parse().context("invalid mail_from address")?)
            .to(email.to.parse().context("invalid recipient address")?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.text_body.clone())
            .context("failed to build email")?;
        self.transport.send(message).await?;
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(anyhow!("smtp server refused the connection test"))
        }
    }
}

/// Posts each email as JSON to an HTTP endpoint that does the delivery.
pub struct WebhookMailer {
    client: Client,
    url: String,
    token: Option<String>,
    from: String,
}

impl WebhookMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let url = config
            .webhook_url
            .clone()
            .ok_or_else(|| anyhow!("mail_webhook_url is not configured"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            url,
            token: config.webhook_token.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    fn transport_name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let payload = json!({
            "from": self.from,
            "to": email.to,
            "subject": email.subject,
            "text": email.text_body,
        });
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request.send().await?.error_for_status()?;
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        let response = self.client.head(&self.url).send().await?;
        if response.status().is_server_error() {
            anyhow::bail!("mail webhook responded {}", response.status());
        }
        Ok(())
    }
}

/// Writes mail to the log instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn transport_name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        info!(to = %email.to, subject = %email.subject, "email (log transport)\n{}", email.text_body);
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        Ok(())
    }
}

/// Keeps every email in memory. Can be told to fail for delivery-error paths.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    fail_with: Option<String>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    fn transport_name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(anyhow!("{}", message));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(transport: MailTransport) -> MailConfig {
        MailConfig {
            transport,
            from: "Turnout <no-reply@turnout.test>".to_string(),
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            webhook_url: None,
            webhook_token: None,
            timeout_seconds: 5,
        }
    }

    #[test]
    fn transport_selection_follows_config() {
        let mailer = build_mailer(&config(MailTransport::Log)).expect("log mailer");
        assert_eq!(mailer.transport_name(), "log");
        assert!(build_mailer(&config(MailTransport::Webhook)).is_err());
        assert!(build_mailer(&config(MailTransport::Smtp)).is_err());

        let mut webhook = config(MailTransport::Webhook);
        webhook.webhook_url = Some("https://hooks.turnout.test/mail".to_string());
        let mailer = build_mailer(&webhook).expect("webhook mailer");
        assert_eq!(mailer.transport_name(), "webhook");
    }

    #[tokio::test]
    async fn memory_mailer_records_or_fails() {
        let email = OutboundEmail {
            to: "ada@example.com".to_string(),
            subject: "hi".to_string(),
            text_body: "body".to_string(),
        };
        let mailer = MemoryMailer::new();
        mailer.send(&email).await.expect("send");
        assert_eq!(mailer.sent().await.len(), 1);

        let broken = MemoryMailer::failing("relay down");
        assert!(broken.send(&email).await.is_err());
        assert!(broken.sent().await.is_empty());
    }
}
