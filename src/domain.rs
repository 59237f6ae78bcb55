use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered member profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<Uuid>,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub household: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sermon {
    pub id: Option<Uuid>,
    pub title: String,
    pub preacher: String,
    pub scripture_reference: Option<String>,
    pub media_url: Option<String>,
    pub delivered_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A prayer request shared with the community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prayer {
    pub id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub author_id: Option<Uuid>,
    pub prayed_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A parish announcement. Listing excludes notices past `expires_on`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub publish_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: Option<Uuid>,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GivingStatus {
    Pending,
    Successful,
    Failed,
}

impl GivingStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, GivingStatus::Pending)
    }
}

/// A donation/offering entry tied to a member or marked anonymous.
/// Amounts are minor units of `currency`. `reference` is ours;
/// `gateway_ref` is the transaction id assigned by the payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GivingRecord {
    pub id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub anonymous: bool,
    pub amount_minor: i64,
    pub currency: String,
    pub provider: String,
    pub phone: String,
    pub reference: String,
    pub gateway_ref: Option<String>,
    pub status: GivingStatus,
    pub purpose: Option<String>,
    pub campaign_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

/// A fundraising campaign pledges count toward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Option<Uuid>,
    pub name: String,
    pub goal_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PledgeFrequency {
    OneTime,
    Weekly,
    Monthly,
}

/// A commitment to give toward a campaign goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pledge {
    pub id: Option<Uuid>,
    pub member_id: Uuid,
    pub campaign_id: Uuid,
    pub amount_minor: i64,
    pub frequency: PledgeFrequency,
    pub fulfilled_minor: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SacramentRite {
    Baptism,
    Wedding,
    Funeral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SacramentStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Completed,
}

impl SacramentStatus {
    /// Fixed progression: submitted -> under_review -> approved -> completed,
    /// with rejected reachable only from under_review.
    pub fn can_advance_to(&self, next: SacramentStatus) -> bool {
        use SacramentStatus::*;
        matches!(
            (self, next),
            (Submitted, UnderReview) | (UnderReview, Approved) | (UnderReview, Rejected) | (Approved, Completed)
        )
    }
}

/// A member-submitted application for baptism, wedding, or funeral rites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SacramentRequest {
    pub id: Option<Uuid>,
    pub member_id: Uuid,
    pub rite: SacramentRite,
    pub preferred_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: SacramentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Push,
    All,
}

/// A queued or dispatched notification. `member_id` of None means the whole
/// parish audience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub channel: NotificationChannel,
    pub member_id: Option<Uuid>,
    pub queued: bool,
    pub created_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
}

/// A push registration token for a member's device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceToken {
    pub id: Option<Uuid>,
    pub member_id: Uuid,
    pub token: String,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
}
