use crate::app::ports::{ChargeInitiation, ChargeRequest, PaymentGatewayPort};
use crate::config::GatewayConfig;
use crate::domain::GivingStatus;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Reqwest adapter for the mobile-money gateway. Secret key comes from the
/// PAYMENT_SECRET_KEY environment variable.
pub struct HttpPaymentGateway {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GatewayChargeResponse {
    transaction_ref: String,
    instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayVerifyResponse {
    status: String,
}

impl HttpPaymentGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn secret_key() -> Result<String, String> {
        std::env::var("PAYMENT_SECRET_KEY")
            .map_err(|_| "PAYMENT_SECRET_KEY environment variable not set".to_string())
    }
}

#[async_trait]
impl PaymentGatewayPort for HttpPaymentGateway {
    async fn initiate_charge(&self, request: &ChargeRequest) -> Result<ChargeInitiation, String> {
        let key = Self::secret_key()?;
        let endpoint = format!("{}/charges", self.base_url);
        debug!("Initiating mobile-money charge {} at {}", request.reference, endpoint);

        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(&key)
            .json(&json!({
                "amount_minor": request.amount_minor,
                "currency": request.currency,
                "phone_number": request.phone,
                "network": request.provider,
                "reference": request.reference,
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("charge initiation failed: {} - {}", status, body));
        }

        let charge: GatewayChargeResponse = resp.json().await.map_err(|e| e.to_string())?;
        Ok(ChargeInitiation {
            gateway_ref: charge.transaction_ref,
            instructions: charge.instructions,
        })
    }

    async fn verify_transaction(&self, reference: &str) -> Result<GivingStatus, String> {
        let key = Self::secret_key()?;
        let endpoint = format!("{}/transactions/verify/{}", self.base_url, reference);

        let resp = self
            .client
            .get(&endpoint)
            .bearer_auth(&key)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("transaction verify failed: {} - {}", status, body));
        }

        let verify: GatewayVerifyResponse = resp.json().await.map_err(|e| e.to_string())?;
        Ok(match verify.status.as_str() {
            "successful" | "success" => GivingStatus::Successful,
            "failed" => GivingStatus::Failed,
            _ => GivingStatus::Pending,
        })
    }
}
