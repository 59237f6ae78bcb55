use crate::domain::*;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

mod in_memory;
pub use in_memory::InMemoryStorage;

#[cfg(feature = "db")]
mod libsql_store;
#[cfg(feature = "db")]
pub use libsql_store::LibsqlStorage;

/// Storage trait for all persisted parish records
#[async_trait]
pub trait Storage: Send + Sync {
    // Member operations
    async fn create_member(&self, member: &mut Member) -> Result<()>;
    async fn get_member(&self, id: Uuid) -> Result<Option<Member>>;
    async fn list_members(&self) -> Result<Vec<Member>>;

    // Sermon operations
    async fn create_sermon(&self, sermon: &mut Sermon) -> Result<()>;
    async fn get_sermon(&self, id: Uuid) -> Result<Option<Sermon>>;
    async fn list_sermons(&self) -> Result<Vec<Sermon>>;

    // Prayer operations
    async fn create_prayer(&self, prayer: &mut Prayer) -> Result<()>;
    async fn get_prayer(&self, id: Uuid) -> Result<Option<Prayer>>;
    async fn update_prayer(&self, prayer: &Prayer) -> Result<()>;
    async fn list_prayers(&self) -> Result<Vec<Prayer>>;

    // Notice operations
    async fn create_notice(&self, notice: &mut Notice) -> Result<()>;
    async fn list_notices(&self) -> Result<Vec<Notice>>;

    // Community post operations
    async fn create_post(&self, post: &mut CommunityPost) -> Result<()>;
    async fn list_posts(&self) -> Result<Vec<CommunityPost>>;

    // Giving operations
    async fn create_giving(&self, record: &mut GivingRecord) -> Result<()>;
    async fn get_giving_by_reference(&self, reference: &str) -> Result<Option<GivingRecord>>;
    async fn update_giving(&self, record: &GivingRecord) -> Result<()>;
    async fn list_giving(&self, member_id: Option<Uuid>) -> Result<Vec<GivingRecord>>;

    // Campaign and pledge operations
    async fn create_campaign(&self, campaign: &mut Campaign) -> Result<()>;
    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>>;
    async fn create_pledge(&self, pledge: &mut Pledge) -> Result<()>;
    async fn update_pledge(&self, pledge: &Pledge) -> Result<()>;
    async fn list_pledges_for_campaign(&self, campaign_id: Uuid) -> Result<Vec<Pledge>>;

    // Sacrament request operations
    async fn create_sacrament_request(&self, request: &mut SacramentRequest) -> Result<()>;
    async fn get_sacrament_request(&self, id: Uuid) -> Result<Option<SacramentRequest>>;
    async fn update_sacrament_request(&self, request: &SacramentRequest) -> Result<()>;
    async fn list_sacrament_requests(&self, member_id: Option<Uuid>) -> Result<Vec<SacramentRequest>>;

    // Device token operations
    async fn create_device_token(&self, token: &mut DeviceToken) -> Result<()>;
    async fn list_device_tokens(&self) -> Result<Vec<DeviceToken>>;

    // Notification operations
    async fn create_notification(&self, notification: &mut Notification) -> Result<()>;
    async fn update_notification(&self, notification: &Notification) -> Result<()>;
    async fn list_queued_notifications(&self) -> Result<Vec<Notification>>;
}
