use crate::app::ports::{ChargeRequest, PaymentGatewayPort};
use crate::constants;
use crate::domain::{GivingRecord, GivingStatus};
use crate::error::{AppError, Result};
use crate::storage::Storage;
use chrono::Utc;
use metrics::counter;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

static MSISDN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{9,15}$").unwrap());

#[derive(Debug, Clone, Deserialize)]
pub struct InitiateGiving {
    pub member_id: Option<Uuid>,
    #[serde(default)]
    pub anonymous: bool,
    pub amount_minor: i64,
    pub currency: Option<String>,
    pub provider: String,
    pub phone: String,
    pub purpose: Option<String>,
    pub campaign_id: Option<Uuid>,
}

/// Webhook body posted by the gateway after the customer approves or
/// declines the debit on their handset.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentWebhook {
    pub reference: String,
    pub gateway_ref: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Settled(GivingStatus),
    /// Record already left pending; replayed deliveries are a no-op.
    AlreadySettled,
    /// Interim gateway status; the record stays pending.
    Ignored,
}

pub struct GivingUseCase {
    storage: Arc<dyn Storage>,
    gateway: Arc<dyn PaymentGatewayPort>,
}

impl GivingUseCase {
    pub fn new(storage: Arc<dyn Storage>, gateway: Arc<dyn PaymentGatewayPort>) -> Self {
        Self { storage, gateway }
    }

    /// Initiate a mobile-money charge and store the pending giving record.
    /// The flow is deliberately linear: one gateway call, one row, no retry.
    pub async fn initiate(&self, input: InitiateGiving) -> Result<GivingRecord> {
        if input.amount_minor <= 0 {
            return Err(AppError::Validation("amount must be positive".to_string()));
        }
        if !constants::known_provider(&input.provider) {
            return Err(AppError::Validation(format!(
                "unknown mobile-money provider '{}'",
                input.provider
            )));
        }
        if !MSISDN_RE.is_match(&input.phone) {
            return Err(AppError::Validation(format!(
                "'{}' is not a valid mobile-money phone number",
                input.phone
            )));
        }
        if !input.anonymous && input.member_id.is_none() {
            return Err(AppError::Validation(
                "giving must name a member or be marked anonymous".to_string(),
            ));
        }

        let reference = generate_reference();
        let currency = input
            .currency
            .unwrap_or_else(|| constants::DEFAULT_CURRENCY.to_string());

        let initiation = self
            .gateway
            .initiate_charge(&ChargeRequest {
                amount_minor: input.amount_minor,
                currency: currency.clone(),
                phone: input.phone.clone(),
                provider: input.provider.clone(),
                reference: reference.clone(),
            })
            .await
            .map_err(|message| AppError::Gateway { message })?;

        let mut record = GivingRecord {
            id: None,
            member_id: if input.anonymous { None } else { input.member_id },
            anonymous: input.anonymous,
            amount_minor: input.amount_minor,
            currency,
            provider: input.provider,
            phone: input.phone,
            reference: reference.clone(),
            gateway_ref: Some(initiation.gateway_ref),
            status: GivingStatus::Pending,
            purpose: input.purpose,
            campaign_id: input.campaign_id,
            created_at: Utc::now(),
            settled_at: None,
        };
        self.storage.create_giving(&mut record).await?;

        counter!("parish_giving_initiated_total").increment(1);
        info!("Initiated giving {} for {} {}", reference, record.amount_minor, record.currency);
        Ok(record)
    }

    /// Apply a gateway webhook: a single status update keyed by our
    /// reference. Idempotency rides on the gateway transaction reference;
    /// a replay for an already-settled record changes nothing.
    pub async fn confirm_from_webhook(&self, payload: PaymentWebhook) -> Result<WebhookOutcome> {
        let mut record = self
            .storage
            .get_giving_by_reference(&payload.reference)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("giving record '{}'", payload.reference)))?;

        if record.status.is_settled() {
            warn!("Webhook replay for settled reference {}", payload.reference);
            counter!("parish_webhook_replays_total").increment(1);
            return Ok(WebhookOutcome::AlreadySettled);
        }

        // Only terminal gateway statuses settle the record; anything else
        // (e.g. an interim "pending") leaves it untouched so the real
        // settlement webhook can still land.
        let status = match payload.status.as_str() {
            "successful" | "success" => GivingStatus::Successful,
            "failed" => GivingStatus::Failed,
            other => {
                warn!(
                    "Interim webhook status '{}' for {}; leaving record pending",
                    other, payload.reference
                );
                return Ok(WebhookOutcome::Ignored);
            }
        };
        record.status = status;
        record.settled_at = Some(Utc::now());
        if payload.gateway_ref.is_some() {
            record.gateway_ref = payload.gateway_ref;
        }
        self.storage.update_giving(&record).await?;

        counter!("parish_webhook_settlements_total").increment(1);
        info!("Settled giving {} as {:?}", record.reference, status);
        Ok(WebhookOutcome::Settled(status))
    }

    /// On-demand verification against the gateway for a still-pending record.
    pub async fn verify(&self, reference: &str) -> Result<GivingRecord> {
        let mut record = self
            .storage
            .get_giving_by_reference(reference)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("giving record '{reference}'")))?;

        if record.status.is_settled() {
            return Ok(record);
        }

        let status = self
            .gateway
            .verify_transaction(reference)
            .await
            .map_err(|message| AppError::Gateway { message })?;
        if status.is_settled() {
            record.status = status;
            record.settled_at = Some(Utc::now());
            self.storage.update_giving(&record).await?;
            info!("Verified giving {} as {:?}", reference, status);
        }
        Ok(record)
    }

    pub async fn list(&self, member_id: Option<Uuid>) -> Result<Vec<GivingRecord>> {
        self.storage.list_giving(member_id).await
    }
}

/// Compares the webhook's shared-secret header against configuration by
/// SHA-256 digest; the fixed-width digests keep the comparison independent
/// of the secret's length.
pub fn signature_matches(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}

fn generate_reference() -> String {
    let ts = Utc::now().format("%Y%m%d%H%M%S");
    let suffix: String = rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("{}-{}-{}", constants::GIVING_REF_PREFIX, ts, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msisdn_pattern_accepts_local_and_e164() {
        assert!(MSISDN_RE.is_match("0244123456"));
        assert!(MSISDN_RE.is_match("+233244123456"));
        assert!(!MSISDN_RE.is_match("not-a-phone"));
        assert!(!MSISDN_RE.is_match("123"));
    }

    #[test]
    fn references_carry_prefix_and_differ() {
        let a = generate_reference();
        let b = generate_reference();
        assert!(a.starts_with(constants::GIVING_REF_PREFIX));
        assert_ne!(a, b);
    }

    #[test]
    fn signature_comparison() {
        assert!(signature_matches("s3cret", "s3cret"));
        assert!(!signature_matches("s3cret", "other"));
        assert!(!signature_matches("", "other"));
    }
}
