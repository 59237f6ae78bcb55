use crate::domain::GivingStatus;
use async_trait::async_trait;

/// Outbound charge request to the mobile-money gateway.
#[derive(Clone, Debug)]
pub struct ChargeRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub phone: String,
    pub provider: String,
    pub reference: String,
}

/// Gateway response to a charge initiation.
#[derive(Clone, Debug)]
pub struct ChargeInitiation {
    pub gateway_ref: String,
    /// Customer-facing prompt, e.g. "approve the debit on your handset"
    pub instructions: Option<String>,
}

#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    async fn initiate_charge(&self, request: &ChargeRequest) -> Result<ChargeInitiation, String>;
    async fn verify_transaction(&self, reference: &str) -> Result<GivingStatus, String>;
}

#[async_trait]
pub trait EmailPort: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}

#[async_trait]
pub trait PushSenderPort: Send + Sync {
    async fn send_to_token(&self, token: &str, title: &str, body: &str) -> Result<(), String>;
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct Passage {
    pub reference: String,
    pub text: String,
    pub copyright: Option<String>,
}

#[async_trait]
pub trait BibleTextPort: Send + Sync {
    async fn fetch_passage(&self, reference: &str) -> Result<Passage, String>;
}
