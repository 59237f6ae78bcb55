use crate::app::ports::{EmailPort, PushSenderPort};
use crate::domain::{Notification, NotificationChannel};
use crate::error::{AppError, Result};
use crate::storage::Storage;
use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct Broadcast {
    pub title: String,
    pub body: String,
    pub channel: NotificationChannel,
    /// None targets the whole parish.
    pub member_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    pub notification_id: Uuid,
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub pushes_sent: usize,
    pub pushes_failed: usize,
}

pub struct NotifyUseCase {
    storage: Arc<dyn Storage>,
    email: Arc<dyn EmailPort>,
    push: Arc<dyn PushSenderPort>,
}

impl NotifyUseCase {
    pub fn new(
        storage: Arc<dyn Storage>,
        email: Arc<dyn EmailPort>,
        push: Arc<dyn PushSenderPort>,
    ) -> Self {
        Self { storage, email, push }
    }

    /// Store a notification and fan it out immediately. One-shot batch:
    /// per-recipient failures are counted and logged, never retried.
    pub async fn broadcast(&self, input: Broadcast) -> Result<DispatchSummary> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("notification title must not be empty".to_string()));
        }
        let mut notification = Notification {
            id: None,
            title: input.title,
            body: input.body,
            channel: input.channel,
            member_id: input.member_id,
            queued: true,
            created_at: Utc::now(),
            dispatched_at: None,
        };
        self.storage.create_notification(&mut notification).await?;
        self.dispatch(&mut notification).await
    }

    /// Drain everything still queued (used by the `dispatch` CLI command).
    pub async fn dispatch_queued(&self) -> Result<Vec<DispatchSummary>> {
        let queued = self.storage.list_queued_notifications().await?;
        let mut summaries = Vec::with_capacity(queued.len());
        for mut notification in queued {
            summaries.push(self.dispatch(&mut notification).await?);
        }
        Ok(summaries)
    }

    async fn dispatch(&self, notification: &mut Notification) -> Result<DispatchSummary> {
        let id = notification.id.ok_or_else(|| AppError::Database {
            message: "Cannot dispatch notification without ID".to_string(),
        })?;

        let mut summary = DispatchSummary {
            notification_id: id,
            emails_sent: 0,
            emails_failed: 0,
            pushes_sent: 0,
            pushes_failed: 0,
        };

        let wants_email = matches!(notification.channel, NotificationChannel::Email | NotificationChannel::All);
        let wants_push = matches!(notification.channel, NotificationChannel::Push | NotificationChannel::All);

        if wants_email {
            for member in self.storage.list_members().await? {
                if let Some(target) = notification.member_id {
                    if member.id != Some(target) {
                        continue;
                    }
                }
                let Some(email) = member.email else { continue };
                match self.email.send(&email, &notification.title, &notification.body).await {
                    Ok(()) => summary.emails_sent += 1,
                    Err(e) => {
                        warn!("Email to {} failed: {}", email, e);
                        summary.emails_failed += 1;
                    }
                }
            }
        }

        if wants_push {
            for device in self.storage.list_device_tokens().await? {
                if let Some(target) = notification.member_id {
                    if device.member_id != target {
                        continue;
                    }
                }
                match self
                    .push
                    .send_to_token(&device.token, &notification.title, &notification.body)
                    .await
                {
                    Ok(()) => summary.pushes_sent += 1,
                    Err(e) => {
                        warn!("Push to device {} failed: {}", device.id.unwrap_or_default(), e);
                        summary.pushes_failed += 1;
                    }
                }
            }
        }

        notification.queued = false;
        notification.dispatched_at = Some(Utc::now());
        self.storage.update_notification(notification).await?;

        counter!("parish_notifications_dispatched_total").increment(1);
        counter!("parish_push_sends_total").increment(summary.pushes_sent as u64);
        counter!("parish_push_failures_total").increment(summary.pushes_failed as u64);
        info!(
            "Dispatched notification {}: {} emails ({} failed), {} pushes ({} failed)",
            id, summary.emails_sent, summary.emails_failed, summary.pushes_sent, summary.pushes_failed
        );
        Ok(summary)
    }
}
