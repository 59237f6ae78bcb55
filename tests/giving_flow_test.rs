mod common;

use anyhow::Result;
use common::{seed_member, storage, FakeGateway};
use parish_hub::app::giving::{GivingUseCase, InitiateGiving, PaymentWebhook, WebhookOutcome};
use parish_hub::domain::GivingStatus;
use parish_hub::error::AppError;
use parish_hub::storage::Storage;
use std::sync::Arc;

fn initiate_input(member_id: Option<uuid::Uuid>) -> InitiateGiving {
    InitiateGiving {
        member_id,
        anonymous: member_id.is_none(),
        amount_minor: 5_000,
        currency: None,
        provider: "mtn".to_string(),
        phone: "0244123456".to_string(),
        purpose: Some("offering".to_string()),
        campaign_id: None,
    }
}

#[tokio::test]
async fn initiate_creates_pending_record_with_gateway_ref() -> Result<()> {
    let storage = storage();
    let member = seed_member(&storage, "Ama Mensah", None).await;
    let gateway = Arc::new(FakeGateway::new());
    let giving = GivingUseCase::new(storage.clone(), gateway.clone());

    let record = giving.initiate(initiate_input(Some(member))).await?;

    assert_eq!(record.status, GivingStatus::Pending);
    assert_eq!(record.currency, "GHS");
    assert!(record.reference.starts_with("PH-GIVE"));
    assert_eq!(record.gateway_ref.as_deref(), Some(format!("GW-{}", record.reference).as_str()));

    // One charge went out, carrying our reference
    let charges = gateway.charges.lock().unwrap();
    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].reference, record.reference);

    // And the record is queryable by reference
    let stored = storage.get_giving_by_reference(&record.reference).await?.unwrap();
    assert_eq!(stored.amount_minor, 5_000);
    Ok(())
}

#[tokio::test]
async fn webhook_settles_once_and_replay_is_noop() -> Result<()> {
    let storage = storage();
    let member = seed_member(&storage, "Kofi Boateng", None).await;
    let giving = GivingUseCase::new(storage.clone(), Arc::new(FakeGateway::new()));
    let record = giving.initiate(initiate_input(Some(member))).await?;

    let payload = PaymentWebhook {
        reference: record.reference.clone(),
        gateway_ref: Some("GW-TX-99".to_string()),
        status: "successful".to_string(),
    };
    let outcome = giving.confirm_from_webhook(payload.clone()).await?;
    assert_eq!(outcome, WebhookOutcome::Settled(GivingStatus::Successful));

    let settled = storage.get_giving_by_reference(&record.reference).await?.unwrap();
    assert_eq!(settled.status, GivingStatus::Successful);
    assert_eq!(settled.gateway_ref.as_deref(), Some("GW-TX-99"));
    assert!(settled.settled_at.is_some());
    let settled_at = settled.settled_at;

    // Replayed delivery: no row change
    let outcome = giving.confirm_from_webhook(payload).await?;
    assert_eq!(outcome, WebhookOutcome::AlreadySettled);
    let after = storage.get_giving_by_reference(&record.reference).await?.unwrap();
    assert_eq!(after.settled_at, settled_at);
    Ok(())
}

#[tokio::test]
async fn webhook_settles_failed_charges() -> Result<()> {
    let storage = storage();
    let giving = GivingUseCase::new(storage.clone(), Arc::new(FakeGateway::new()));
    let record = giving.initiate(initiate_input(None)).await?;

    let outcome = giving
        .confirm_from_webhook(PaymentWebhook {
            reference: record.reference.clone(),
            gateway_ref: None,
            status: "failed".to_string(),
        })
        .await?;
    assert_eq!(outcome, WebhookOutcome::Settled(GivingStatus::Failed));
    Ok(())
}

#[tokio::test]
async fn interim_webhook_status_leaves_record_pending() -> Result<()> {
    let storage = storage();
    let giving = GivingUseCase::new(storage.clone(), Arc::new(FakeGateway::new()));
    let record = giving.initiate(initiate_input(None)).await?;

    let outcome = giving
        .confirm_from_webhook(PaymentWebhook {
            reference: record.reference.clone(),
            gateway_ref: None,
            status: "pending".to_string(),
        })
        .await?;
    assert_eq!(outcome, WebhookOutcome::Ignored);
    let still_pending = storage.get_giving_by_reference(&record.reference).await?.unwrap();
    assert_eq!(still_pending.status, GivingStatus::Pending);
    assert!(still_pending.settled_at.is_none());

    // The genuine settlement afterwards still lands
    let outcome = giving
        .confirm_from_webhook(PaymentWebhook {
            reference: record.reference.clone(),
            gateway_ref: None,
            status: "successful".to_string(),
        })
        .await?;
    assert_eq!(outcome, WebhookOutcome::Settled(GivingStatus::Successful));
    Ok(())
}

#[tokio::test]
async fn webhook_for_unknown_reference_is_not_found() {
    let giving = GivingUseCase::new(storage(), Arc::new(FakeGateway::new()));
    let err = giving
        .confirm_from_webhook(PaymentWebhook {
            reference: "PH-GIVE-NOPE".to_string(),
            gateway_ref: None,
            status: "successful".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn verify_updates_a_pending_record() -> Result<()> {
    let storage = storage();
    let gateway = Arc::new(FakeGateway::new());
    let giving = GivingUseCase::new(storage.clone(), gateway.clone());
    let record = giving.initiate(initiate_input(None)).await?;

    // Gateway still pending: record untouched
    let unchanged = giving.verify(&record.reference).await?;
    assert_eq!(unchanged.status, GivingStatus::Pending);

    *gateway.verify_status.lock().unwrap() = GivingStatus::Successful;
    let verified = giving.verify(&record.reference).await?;
    assert_eq!(verified.status, GivingStatus::Successful);
    Ok(())
}

#[tokio::test]
async fn initiate_rejects_bad_input() {
    let storage = storage();
    let giving = GivingUseCase::new(storage, Arc::new(FakeGateway::new()));

    let mut bad_amount = initiate_input(None);
    bad_amount.amount_minor = 0;
    assert!(matches!(
        giving.initiate(bad_amount).await.unwrap_err(),
        AppError::Validation(_)
    ));

    let mut bad_provider = initiate_input(None);
    bad_provider.provider = "smoke-signals".to_string();
    assert!(matches!(
        giving.initiate(bad_provider).await.unwrap_err(),
        AppError::Validation(_)
    ));

    let mut bad_phone = initiate_input(None);
    bad_phone.phone = "not-a-phone".to_string();
    assert!(matches!(
        giving.initiate(bad_phone).await.unwrap_err(),
        AppError::Validation(_)
    ));

    // Neither a member nor anonymous
    let mut nobody = initiate_input(None);
    nobody.anonymous = false;
    assert!(matches!(
        giving.initiate(nobody).await.unwrap_err(),
        AppError::Validation(_)
    ));
}
