//! Mail Transports
//!
//! `HttpMailer` posts messages to a JSON mail-relay endpoint
//! (`{from, to, subject, text}` with a bearer key). `LogMailer` only logs
//! and must be opted into. `UnconfiguredMailer` fails every send.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use storefront_core::{Ack, DeliveryError, Mailer};

/// Mail relay configuration
#[derive(Clone, Debug)]
pub struct MailerConfig {
    /// Relay endpoint accepting JSON messages
    pub api_url: String,

    /// Relay API key (sent as a bearer token)
    pub api_key: String,

    /// Sender address; also the store mailbox
    pub from: String,

    /// Per-message deadline
    pub timeout: Duration,
}

impl MailerConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Create from environment variables
    pub fn from_env() -> Result<Self, DeliveryError> {
        let var = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| DeliveryError::NotConfigured(format!("{key} not set")))
        };

        let timeout = std::env::var("OUTBOUND_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Self::DEFAULT_TIMEOUT, Duration::from_secs);

        Ok(Self {
            api_url: var("MAIL_API_URL")?,
            api_key: var("MAIL_API_KEY")?,
            from: var("EMAIL_USER")?,
            timeout,
        })
    }
}

#[derive(Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct RelayReceipt {
    #[serde(default, alias = "messageId")]
    id: Option<String>,
}

/// Mail-relay HTTP transport
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl HttpMailer {
    /// Create from configuration
    pub fn from_config(config: MailerConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Sender address
    pub fn sender(&self) -> &str {
        &self.config.from
    }
}

fn transport_error(err: &reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Transport(err.to_string())
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<Ack, DeliveryError> {
        let mail = OutgoingMail {
            from: &self.config.from,
            to: recipient,
            subject,
            text: body,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&mail)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(&e))?;

        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                detail: text,
            });
        }

        let ack = serde_json::from_str::<RelayReceipt>(&text)
            .ok()
            .and_then(|r| r.id)
            .map_or_else(Ack::accepted, Ack::with_id);

        tracing::debug!(to = recipient, subject, message_id = ?ack.message_id, "Mail accepted");
        Ok(ack)
    }

    fn name(&self) -> &str {
        "http-relay"
    }
}

/// Logs messages instead of sending them (for development)
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<Ack, DeliveryError> {
        tracing::info!(to = recipient, subject, "Mail (not sent, no transport configured)");
        tracing::debug!("{}", body);
        Ok(Ack::accepted())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Stands in when no transport is configured; every send fails
#[derive(Debug)]
pub struct UnconfiguredMailer {
    reason: String,
}

impl UnconfiguredMailer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        _body: &str,
    ) -> Result<Ack, DeliveryError> {
        tracing::warn!(to = recipient, subject, reason = %self.reason, "Mail not sent");
        Err(DeliveryError::NotConfigured(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> MailerConfig {
        MailerConfig {
            api_url: format!("{}/v1/send", server.uri()),
            api_key: "mail-key".into(),
            from: "shop@example.com".into(),
            timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_send_posts_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .and(header("authorization", "Bearer mail-key"))
            .and(body_partial_json(serde_json::json!({
                "from": "shop@example.com",
                "to": "a@b.com",
                "subject": "Hi",
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mailer = HttpMailer::from_config(config(&server)).unwrap();
        let ack = mailer.send("a@b.com", "Hi", "Body").await.unwrap();
        assert_eq!(ack.message_id.as_deref(), Some("m-1"));
    }

    #[tokio::test]
    async fn test_rejection_carries_diagnostic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
            .mount(&server)
            .await;

        let mailer = HttpMailer::from_config(config(&server)).unwrap();
        let err = mailer.send("a@b.com", "Hi", "Body").await.unwrap_err();
        match err {
            DeliveryError::Rejected { status, detail } => {
                assert_eq!(status, 401);
                assert_eq!(detail, "invalid credentials");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_slow_relay_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let mut config = config(&server);
        config.timeout = Duration::from_millis(200);
        let mailer = HttpMailer::from_config(config).unwrap();
        let err = mailer.send("a@b.com", "Hi", "Body").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Timeout));
    }

    #[tokio::test]
    async fn test_log_mailer_acknowledges() {
        assert!(LogMailer.send("a@b.com", "Hi", "Body").await.is_ok());
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_refuses() {
        let mailer = UnconfiguredMailer::new("MAIL_API_KEY not set");
        let err = mailer.send("a@b.com", "Hi", "Body").await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured(ref r) if r == "MAIL_API_KEY not set"));
    }
}
