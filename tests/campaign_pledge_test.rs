mod common;

use anyhow::Result;
use chrono::Utc;
use common::{seed_member, storage};
use parish_hub::app::pledges::{CreatePledge, PledgeUseCase};
use parish_hub::domain::{Campaign, PledgeFrequency};
use parish_hub::error::AppError;
use parish_hub::storage::Storage;
use std::sync::Arc;
use uuid::Uuid;

async fn seed_campaign(storage: &Arc<dyn Storage>, goal_minor: i64) -> Uuid {
    let mut campaign = Campaign {
        id: None,
        name: "Roof Fund".to_string(),
        goal_minor,
        currency: "GHS".to_string(),
        created_at: Utc::now(),
    };
    storage.create_campaign(&mut campaign).await.unwrap();
    campaign.id.unwrap()
}

#[tokio::test]
async fn progress_sums_pledges_and_fulfilments() -> Result<()> {
    let storage = storage();
    let member = seed_member(&storage, "Akosua Sarpong", None).await;
    let campaign = seed_campaign(&storage, 100_000).await;
    let pledges = PledgeUseCase::new(storage.clone());

    let mut monthly = pledges
        .create(CreatePledge {
            member_id: member,
            campaign_id: campaign,
            amount_minor: 20_000,
            frequency: PledgeFrequency::Monthly,
        })
        .await?;
    pledges
        .create(CreatePledge {
            member_id: member,
            campaign_id: campaign,
            amount_minor: 30_000,
            frequency: PledgeFrequency::OneTime,
        })
        .await?;

    pledges.record_fulfilment(&mut monthly, 10_000).await?;

    let progress = pledges.campaign_progress(campaign).await?;
    assert_eq!(progress.goal_minor, 100_000);
    assert_eq!(progress.pledged_minor, 50_000);
    assert_eq!(progress.fulfilled_minor, 10_000);
    assert!((progress.percent_fulfilled - 10.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn pledge_requires_existing_campaign_and_positive_amount() {
    let storage = storage();
    let pledges = PledgeUseCase::new(storage.clone());

    let err = pledges
        .create(CreatePledge {
            member_id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            amount_minor: 1_000,
            frequency: PledgeFrequency::Weekly,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = pledges
        .create(CreatePledge {
            member_id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            amount_minor: 0,
            frequency: PledgeFrequency::Weekly,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn progress_for_unknown_campaign_is_not_found() {
    let pledges = PledgeUseCase::new(storage());
    let err = pledges.campaign_progress(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
