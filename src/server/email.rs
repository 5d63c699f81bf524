/// Verification email delivery
///
/// The function receives the recipient, display name, and code, and forwards
/// to the mail provider behind the `Mailer` trait. Provider failure is
/// caught at the boundary and returned as a structured 500; no retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider request failed: {0}")]
    Transport(String),
    #[error("mail provider rejected the message: {0}")]
    Rejected(String),
}

/// Incoming payload for the send-verification function
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendVerificationRequest {
    pub email: String,
    pub user_name: String,
    pub verification_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendVerificationResponse {
    pub success: bool,
    pub message_id: String,
}

/// Outbound delivery collaborator
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver the verification email, returning the provider message id
    async fn send_verification(&self, request: &SendVerificationRequest)
        -> Result<String, MailError>;
}

/// Real provider client, configured from the environment
///
/// Reads `MAIL_API_URL` and `MAIL_API_KEY`. Returns `None` when either is
/// missing so serve mode can fall back to the logging mailer.
pub struct ProviderMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ProviderMailer {
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("MAIL_API_URL").ok()?;
        let api_key = std::env::var("MAIL_API_KEY").ok()?;
        Some(ProviderMailer {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for ProviderMailer {
    async fn send_verification(
        &self,
        request: &SendVerificationRequest,
    ) -> Result<String, MailError> {
        let body = json!({
            "to": request.email,
            "subject": "Verify your Brushstack account",
            "html": format!(
                "<p>Hi {},</p><p>Your verification code is <b>{}</b>.</p>",
                request.user_name, request.verification_code
            ),
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(format!("{}: {}", status, detail)));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        let message_id = payload
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(message_id)
    }
}

/// Local stand-in when no provider is configured: log and fabricate an id
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send_verification(
        &self,
        request: &SendVerificationRequest,
    ) -> Result<String, MailError> {
        tracing::info!(
            email = %request.email,
            user = %request.user_name,
            "verification email (logging mailer, nothing sent)"
        );
        Ok(format!("local-{}", request.verification_code))
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Scripted mailer for router tests
    pub struct StubMailer {
        pub fail: bool,
        pub sent: Mutex<Vec<SendVerificationRequest>>,
    }

    impl StubMailer {
        pub fn ok() -> Self {
            StubMailer {
                fail: false,
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            StubMailer {
                fail: true,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for StubMailer {
        async fn send_verification(
            &self,
            request: &SendVerificationRequest,
        ) -> Result<String, MailError> {
            if self.fail {
                return Err(MailError::Rejected("quota exceeded".to_string()));
            }
            self.sent.lock().unwrap().push(request.clone());
            Ok("msg-123".to_string())
        }
    }
}
