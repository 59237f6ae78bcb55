use crate::app::ports::EmailPort;
use crate::config::EmailConfig;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// REST email provider adapter. API key comes from EMAIL_API_KEY.
pub struct RestEmailer {
    base_url: String,
    from_address: String,
}

impl RestEmailer {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            from_address: config.from_address.clone(),
        }
    }
}

#[async_trait]
impl EmailPort for RestEmailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let key = std::env::var("EMAIL_API_KEY")
            .map_err(|_| "EMAIL_API_KEY environment variable not set".to_string())?;
        let endpoint = format!("{}/emails", self.base_url);
        debug!("Sending email to {} via {}", to, endpoint);

        let client = reqwest::Client::new();
        let resp = client
            .post(&endpoint)
            .bearer_auth(key)
            .json(&json!({
                "from": self.from_address,
                "to": [to],
                "subject": subject,
                "text": body,
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            let resp_body = resp.text().await.unwrap_or_default();
            return Err(format!("email send failed: {} - {}", status, resp_body));
        }
        Ok(())
    }
}
