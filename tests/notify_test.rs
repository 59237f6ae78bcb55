mod common;

use anyhow::Result;
use chrono::Utc;
use common::{seed_member, storage, FakeEmail, FakePush};
use parish_hub::app::notify::{Broadcast, NotifyUseCase};
use parish_hub::domain::{DeviceToken, NotificationChannel};
use parish_hub::error::AppError;
use parish_hub::storage::Storage;
use std::sync::Arc;
use uuid::Uuid;

async fn seed_device(storage: &Arc<dyn parish_hub::storage::Storage>, member_id: Uuid, token: &str) {
    let mut device = DeviceToken {
        id: None,
        member_id,
        token: token.to_string(),
        platform: Some("android".to_string()),
        created_at: Utc::now(),
    };
    storage.create_device_token(&mut device).await.unwrap();
}

#[tokio::test]
async fn broadcast_fans_out_to_every_email_and_token() -> Result<()> {
    let storage = storage();
    let a = seed_member(&storage, "Member A", Some("a@parish.example")).await;
    let _b = seed_member(&storage, "Member B", Some("b@parish.example")).await;
    // No email on this one, push only
    let c = seed_member(&storage, "Member C", None).await;
    seed_device(&storage, a, "token-a").await;
    seed_device(&storage, c, "token-c").await;

    let email = Arc::new(FakeEmail::new());
    let push = Arc::new(FakePush::new());
    let notify = NotifyUseCase::new(storage.clone(), email.clone(), push.clone());

    let summary = notify
        .broadcast(Broadcast {
            title: "Harvest Sunday".to_string(),
            body: "Service starts at 9am.".to_string(),
            channel: NotificationChannel::All,
            member_id: None,
        })
        .await?;

    assert_eq!(summary.emails_sent, 2);
    assert_eq!(summary.pushes_sent, 2);
    assert_eq!(summary.emails_failed, 0);
    assert_eq!(summary.pushes_failed, 0);
    assert_eq!(email.sent.lock().unwrap().len(), 2);
    assert!(push.sent.lock().unwrap().contains(&"token-a".to_string()));

    // Nothing left queued after a broadcast
    assert!(storage.list_queued_notifications().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn per_token_failures_are_counted_not_fatal() -> Result<()> {
    let storage = storage();
    let member = seed_member(&storage, "Member", None).await;
    seed_device(&storage, member, "good-token").await;
    seed_device(&storage, member, "dead-token").await;

    let mut push = FakePush::new();
    push.fail_tokens = vec!["dead-token".to_string()];
    let notify = NotifyUseCase::new(storage.clone(), Arc::new(FakeEmail::new()), Arc::new(push));

    let summary = notify
        .broadcast(Broadcast {
            title: "Midweek prayers".to_string(),
            body: "Wednesday 6pm.".to_string(),
            channel: NotificationChannel::Push,
            member_id: None,
        })
        .await?;

    assert_eq!(summary.pushes_sent, 1);
    assert_eq!(summary.pushes_failed, 1);
    Ok(())
}

#[tokio::test]
async fn targeted_broadcast_reaches_one_member() -> Result<()> {
    let storage = storage();
    let target = seed_member(&storage, "Target", Some("target@parish.example")).await;
    let other = seed_member(&storage, "Other", Some("other@parish.example")).await;
    seed_device(&storage, target, "target-token").await;
    seed_device(&storage, other, "other-token").await;

    let email = Arc::new(FakeEmail::new());
    let push = Arc::new(FakePush::new());
    let notify = NotifyUseCase::new(storage.clone(), email.clone(), push.clone());

    let summary = notify
        .broadcast(Broadcast {
            title: "Your baptism date".to_string(),
            body: "Confirmed for next Sunday.".to_string(),
            channel: NotificationChannel::All,
            member_id: Some(target),
        })
        .await?;

    assert_eq!(summary.emails_sent, 1);
    assert_eq!(summary.pushes_sent, 1);
    assert_eq!(email.sent.lock().unwrap()[0].0, "target@parish.example");
    assert_eq!(push.sent.lock().unwrap()[0], "target-token");
    Ok(())
}

#[tokio::test]
async fn dispatch_queued_drains_the_backlog() -> Result<()> {
    let storage = storage();
    seed_member(&storage, "Member", Some("m@parish.example")).await;

    // Queue two notifications directly, as the webhook path would
    for title in ["First", "Second"] {
        let mut n = parish_hub::domain::Notification {
            id: None,
            title: title.to_string(),
            body: "body".to_string(),
            channel: NotificationChannel::Email,
            member_id: None,
            queued: true,
            created_at: Utc::now(),
            dispatched_at: None,
        };
        storage.create_notification(&mut n).await?;
    }

    let notify = NotifyUseCase::new(storage.clone(), Arc::new(FakeEmail::new()), Arc::new(FakePush::new()));
    let summaries = notify.dispatch_queued().await?;
    assert_eq!(summaries.len(), 2);
    assert!(storage.list_queued_notifications().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn broadcast_rejects_empty_title() {
    let notify = NotifyUseCase::new(storage(), Arc::new(FakeEmail::new()), Arc::new(FakePush::new()));
    let err = notify
        .broadcast(Broadcast {
            title: "   ".to_string(),
            body: "body".to_string(),
            channel: NotificationChannel::Email,
            member_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
