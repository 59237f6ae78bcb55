use crate::domain::{Pledge, PledgeFrequency};
use crate::error::{AppError, Result};
use crate::storage::Storage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePledge {
    pub member_id: Uuid,
    pub campaign_id: Uuid,
    pub amount_minor: i64,
    pub frequency: PledgeFrequency,
}

/// How far a campaign has come against its goal.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignProgress {
    pub campaign_id: Uuid,
    pub name: String,
    pub currency: String,
    pub goal_minor: i64,
    pub pledged_minor: i64,
    pub fulfilled_minor: i64,
    pub percent_fulfilled: f64,
}

pub struct PledgeUseCase {
    storage: Arc<dyn Storage>,
}

impl PledgeUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn create(&self, input: CreatePledge) -> Result<Pledge> {
        if input.amount_minor <= 0 {
            return Err(AppError::Validation("pledge amount must be positive".to_string()));
        }
        if self.storage.get_campaign(input.campaign_id).await?.is_none() {
            return Err(AppError::NotFound(format!("campaign {}", input.campaign_id)));
        }
        let mut pledge = Pledge {
            id: None,
            member_id: input.member_id,
            campaign_id: input.campaign_id,
            amount_minor: input.amount_minor,
            frequency: input.frequency,
            fulfilled_minor: 0,
            created_at: Utc::now(),
        };
        self.storage.create_pledge(&mut pledge).await?;
        info!("Pledge created toward campaign {}", input.campaign_id);
        Ok(pledge)
    }

    /// Credit a fulfilment (e.g. a settled giving record earmarked for the
    /// campaign) against a pledge.
    pub async fn record_fulfilment(&self, pledge: &mut Pledge, amount_minor: i64) -> Result<()> {
        if amount_minor <= 0 {
            return Err(AppError::Validation("fulfilment amount must be positive".to_string()));
        }
        pledge.fulfilled_minor += amount_minor;
        self.storage.update_pledge(pledge).await
    }

    pub async fn campaign_progress(&self, campaign_id: Uuid) -> Result<CampaignProgress> {
        let campaign = self
            .storage
            .get_campaign(campaign_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("campaign {campaign_id}")))?;

        let pledges = self.storage.list_pledges_for_campaign(campaign_id).await?;
        let pledged_minor: i64 = pledges.iter().map(|p| p.amount_minor).sum();
        let fulfilled_minor: i64 = pledges.iter().map(|p| p.fulfilled_minor).sum();
        let percent_fulfilled = if campaign.goal_minor > 0 {
            (fulfilled_minor as f64 / campaign.goal_minor as f64) * 100.0
        } else {
            0.0
        };

        Ok(CampaignProgress {
            campaign_id,
            name: campaign.name,
            currency: campaign.currency,
            goal_minor: campaign.goal_minor,
            pledged_minor,
            fulfilled_minor,
            percent_fulfilled,
        })
    }
}
