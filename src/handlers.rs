use crate::app::giving::{signature_matches, InitiateGiving, PaymentWebhook, WebhookOutcome};
use crate::app::notify::Broadcast;
use crate::app::pledges::CreatePledge;
use crate::app::ports::Passage;
use crate::app::sacraments::SubmitSacramentRequest;
use crate::domain::*;
use crate::error::AppError;
use crate::server::AppState;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::Extension;
use chrono::{NaiveDate, Utc};
use metrics::counter;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Gateway { .. } | AppError::Provider { .. } | AppError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Shallow error surface: log the detail, return a generic message
        error!("Request failed: {}", self);
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "internal error".to_string(),
            _ => self.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type HandlerResult<T> = std::result::Result<Json<T>, AppError>;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "parish-hub",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ---- Members ----

#[derive(Debug, Deserialize)]
pub struct CreateMember {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub household: Option<String>,
}

pub async fn create_member(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<CreateMember>,
) -> HandlerResult<Member> {
    if input.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name must not be empty".to_string()));
    }
    let mut member = Member {
        id: None,
        full_name: input.full_name,
        phone: input.phone,
        email: input.email,
        household: input.household,
        created_at: Utc::now(),
    };
    state.storage.create_member(&mut member).await?;
    Ok(Json(member))
}

pub async fn list_members(Extension(state): Extension<Arc<AppState>>) -> HandlerResult<Vec<Member>> {
    Ok(Json(state.storage.list_members().await?))
}

pub async fn get_member(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Member> {
    let member = state
        .storage
        .get_member(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("member {id}")))?;
    Ok(Json(member))
}

// ---- Sermons ----

#[derive(Debug, Deserialize)]
pub struct CreateSermon {
    pub title: String,
    pub preacher: String,
    pub scripture_reference: Option<String>,
    pub media_url: Option<String>,
    pub delivered_on: NaiveDate,
}

pub async fn create_sermon(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<CreateSermon>,
) -> HandlerResult<Sermon> {
    let mut sermon = Sermon {
        id: None,
        title: input.title,
        preacher: input.preacher,
        scripture_reference: input.scripture_reference,
        media_url: input.media_url,
        delivered_on: input.delivered_on,
        created_at: Utc::now(),
    };
    state.storage.create_sermon(&mut sermon).await?;
    Ok(Json(sermon))
}

pub async fn list_sermons(Extension(state): Extension<Arc<AppState>>) -> HandlerResult<Vec<Sermon>> {
    Ok(Json(state.storage.list_sermons().await?))
}

pub async fn get_sermon(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Sermon> {
    let sermon = state
        .storage
        .get_sermon(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("sermon {id}")))?;
    Ok(Json(sermon))
}

// ---- Prayers ----

#[derive(Debug, Deserialize)]
pub struct CreatePrayer {
    pub title: String,
    pub body: String,
    pub author_id: Option<Uuid>,
}

pub async fn create_prayer(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<CreatePrayer>,
) -> HandlerResult<Prayer> {
    let mut prayer = Prayer {
        id: None,
        title: input.title,
        body: input.body,
        author_id: input.author_id,
        prayed_count: 0,
        created_at: Utc::now(),
    };
    state.storage.create_prayer(&mut prayer).await?;
    Ok(Json(prayer))
}

pub async fn list_prayers(Extension(state): Extension<Arc<AppState>>) -> HandlerResult<Vec<Prayer>> {
    Ok(Json(state.storage.list_prayers().await?))
}

/// "I prayed for this" counter bump.
pub async fn pray(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Prayer> {
    let mut prayer = state
        .storage
        .get_prayer(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("prayer {id}")))?;
    prayer.prayed_count += 1;
    state.storage.update_prayer(&prayer).await?;
    Ok(Json(prayer))
}

// ---- Notices ----

#[derive(Debug, Deserialize)]
pub struct CreateNotice {
    pub title: String,
    pub body: String,
    pub publish_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
}

pub async fn create_notice(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<CreateNotice>,
) -> HandlerResult<Notice> {
    let mut notice = Notice {
        id: None,
        title: input.title,
        body: input.body,
        publish_on: input.publish_on,
        expires_on: input.expires_on,
        created_at: Utc::now(),
    };
    state.storage.create_notice(&mut notice).await?;
    Ok(Json(notice))
}

pub async fn list_notices(Extension(state): Extension<Arc<AppState>>) -> HandlerResult<Vec<Notice>> {
    let today = Utc::now().date_naive();
    let notices = state
        .storage
        .list_notices()
        .await?
        .into_iter()
        .filter(|n| n.expires_on.map_or(true, |d| d >= today))
        .collect();
    Ok(Json(notices))
}

// ---- Community posts ----

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub author_id: Uuid,
    pub body: String,
}

pub async fn create_post(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<CreatePost>,
) -> HandlerResult<CommunityPost> {
    if state.storage.get_member(input.author_id).await?.is_none() {
        return Err(AppError::NotFound(format!("member {}", input.author_id)));
    }
    let mut post = CommunityPost {
        id: None,
        author_id: input.author_id,
        body: input.body,
        created_at: Utc::now(),
    };
    state.storage.create_post(&mut post).await?;
    Ok(Json(post))
}

pub async fn list_posts(
    Extension(state): Extension<Arc<AppState>>,
) -> HandlerResult<Vec<CommunityPost>> {
    Ok(Json(state.storage.list_posts().await?))
}

// ---- Giving ----

#[derive(Debug, Deserialize)]
pub struct MemberFilter {
    pub member_id: Option<Uuid>,
}

pub async fn initiate_giving(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<InitiateGiving>,
) -> HandlerResult<GivingRecord> {
    Ok(Json(state.giving.initiate(input).await?))
}

pub async fn list_giving(
    Extension(state): Extension<Arc<AppState>>,
    Query(filter): Query<MemberFilter>,
) -> HandlerResult<Vec<GivingRecord>> {
    Ok(Json(state.giving.list(filter.member_id).await?))
}

pub async fn verify_giving(
    Extension(state): Extension<Arc<AppState>>,
    Path(reference): Path<String>,
) -> HandlerResult<GivingRecord> {
    Ok(Json(state.giving.verify(&reference).await?))
}

/// Inbound payment gateway webhook, validated by the shared-secret header.
pub async fn payment_webhook(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<PaymentWebhook>,
) -> HandlerResult<serde_json::Value> {
    let expected = std::env::var("PAYMENT_WEBHOOK_SECRET")
        .map_err(|_| AppError::Config("PAYMENT_WEBHOOK_SECRET not set".to_string()))?;
    let provided = headers
        .get(state.webhook_header.as_str())
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !signature_matches(provided, &expected) {
        counter!("parish_webhook_rejected_total").increment(1);
        return Err(AppError::Unauthorized("webhook signature mismatch".to_string()));
    }

    let outcome = state.giving.confirm_from_webhook(payload).await?;
    let body = match outcome {
        WebhookOutcome::Settled(status) => json!({ "status": status }),
        WebhookOutcome::AlreadySettled => json!({ "status": "already_settled" }),
        WebhookOutcome::Ignored => json!({ "status": "ignored" }),
    };
    Ok(Json(body))
}

// ---- Campaigns and pledges ----

#[derive(Debug, Deserialize)]
pub struct CreateCampaign {
    pub name: String,
    pub goal_minor: i64,
    pub currency: Option<String>,
}

pub async fn create_campaign(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<CreateCampaign>,
) -> HandlerResult<Campaign> {
    if input.goal_minor <= 0 {
        return Err(AppError::Validation("campaign goal must be positive".to_string()));
    }
    let mut campaign = Campaign {
        id: None,
        name: input.name,
        goal_minor: input.goal_minor,
        currency: input
            .currency
            .unwrap_or_else(|| crate::constants::DEFAULT_CURRENCY.to_string()),
        created_at: Utc::now(),
    };
    state.storage.create_campaign(&mut campaign).await?;
    Ok(Json(campaign))
}

pub async fn create_pledge(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<CreatePledge>,
) -> HandlerResult<Pledge> {
    Ok(Json(state.pledges.create(input).await?))
}

pub async fn campaign_progress(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<crate::app::pledges::CampaignProgress> {
    Ok(Json(state.pledges.campaign_progress(id).await?))
}

// ---- Sacrament requests ----

pub async fn submit_sacrament(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<SubmitSacramentRequest>,
) -> HandlerResult<SacramentRequest> {
    Ok(Json(state.sacraments.submit(input).await?))
}

pub async fn list_sacraments(
    Extension(state): Extension<Arc<AppState>>,
    Query(filter): Query<MemberFilter>,
) -> HandlerResult<Vec<SacramentRequest>> {
    Ok(Json(state.sacraments.list(filter.member_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: SacramentStatus,
}

pub async fn advance_sacrament(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> HandlerResult<SacramentRequest> {
    Ok(Json(state.sacraments.advance(id, change.status).await?))
}

// ---- Devices ----

#[derive(Debug, Deserialize)]
pub struct RegisterDevice {
    pub member_id: Uuid,
    pub token: String,
    pub platform: Option<String>,
}

pub async fn register_device(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<RegisterDevice>,
) -> HandlerResult<DeviceToken> {
    if input.token.trim().is_empty() {
        return Err(AppError::Validation("device token must not be empty".to_string()));
    }
    let mut device = DeviceToken {
        id: None,
        member_id: input.member_id,
        token: input.token,
        platform: input.platform,
        created_at: Utc::now(),
    };
    state.storage.create_device_token(&mut device).await?;
    Ok(Json(device))
}

// ---- Notifications ----

pub async fn broadcast_notification(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<Broadcast>,
) -> HandlerResult<crate::app::notify::DispatchSummary> {
    Ok(Json(state.notify.broadcast(input).await?))
}

// ---- Bible ----

#[derive(Debug, Deserialize)]
pub struct PassageQuery {
    pub reference: String,
}

pub async fn bible_passage(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<PassageQuery>,
) -> HandlerResult<Passage> {
    let passage = state
        .bible
        .fetch_passage(&query.reference)
        .await
        .map_err(|message| AppError::Provider { message })?;
    Ok(Json(passage))
}
