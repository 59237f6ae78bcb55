use crate::domain::*;
use crate::error::{AppError, Result};
use crate::storage::Storage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// In-memory storage implementation for development/testing
pub struct InMemoryStorage {
    members: Arc<Mutex<HashMap<Uuid, Member>>>,
    sermons: Arc<Mutex<HashMap<Uuid, Sermon>>>,
    prayers: Arc<Mutex<HashMap<Uuid, Prayer>>>,
    notices: Arc<Mutex<HashMap<Uuid, Notice>>>,
    posts: Arc<Mutex<HashMap<Uuid, CommunityPost>>>,
    giving: Arc<Mutex<HashMap<Uuid, GivingRecord>>>,
    campaigns: Arc<Mutex<HashMap<Uuid, Campaign>>>,
    pledges: Arc<Mutex<HashMap<Uuid, Pledge>>>,
    sacraments: Arc<Mutex<HashMap<Uuid, SacramentRequest>>>,
    device_tokens: Arc<Mutex<HashMap<Uuid, DeviceToken>>>,
    notifications: Arc<Mutex<HashMap<Uuid, Notification>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            members: Arc::new(Mutex::new(HashMap::new())),
            sermons: Arc::new(Mutex::new(HashMap::new())),
            prayers: Arc::new(Mutex::new(HashMap::new())),
            notices: Arc::new(Mutex::new(HashMap::new())),
            posts: Arc::new(Mutex::new(HashMap::new())),
            giving: Arc::new(Mutex::new(HashMap::new())),
            campaigns: Arc::new(Mutex::new(HashMap::new())),
            pledges: Arc::new(Mutex::new(HashMap::new())),
            sacraments: Arc::new(Mutex::new(HashMap::new())),
            device_tokens: Arc::new(Mutex::new(HashMap::new())),
            notifications: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn require_id(id: Option<Uuid>, what: &str) -> Result<Uuid> {
    id.ok_or_else(|| AppError::Database {
        message: format!("Cannot update {what} without ID"),
    })
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_member(&self, member: &mut Member) -> Result<()> {
        let id = Uuid::new_v4();
        member.id = Some(id);
        self.members.lock().unwrap().insert(id, member.clone());
        debug!("Created member: {} with id {}", member.full_name, id);
        Ok(())
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
        Ok(self.members.lock().unwrap().get(&id).cloned())
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self.members.lock().unwrap().values().cloned().collect();
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(members)
    }

    async fn create_sermon(&self, sermon: &mut Sermon) -> Result<()> {
        let id = Uuid::new_v4();
        sermon.id = Some(id);
        self.sermons.lock().unwrap().insert(id, sermon.clone());
        debug!("Created sermon: {} with id {}", sermon.title, id);
        Ok(())
    }

    async fn get_sermon(&self, id: Uuid) -> Result<Option<Sermon>> {
        Ok(self.sermons.lock().unwrap().get(&id).cloned())
    }

    async fn list_sermons(&self) -> Result<Vec<Sermon>> {
        let mut sermons: Vec<Sermon> = self.sermons.lock().unwrap().values().cloned().collect();
        // Most recent sermon first
        sermons.sort_by(|a, b| b.delivered_on.cmp(&a.delivered_on));
        Ok(sermons)
    }

    async fn create_prayer(&self, prayer: &mut Prayer) -> Result<()> {
        let id = Uuid::new_v4();
        prayer.id = Some(id);
        self.prayers.lock().unwrap().insert(id, prayer.clone());
        debug!("Created prayer: {} with id {}", prayer.title, id);
        Ok(())
    }

    async fn get_prayer(&self, id: Uuid) -> Result<Option<Prayer>> {
        Ok(self.prayers.lock().unwrap().get(&id).cloned())
    }

    async fn update_prayer(&self, prayer: &Prayer) -> Result<()> {
        let id = require_id(prayer.id, "prayer")?;
        self.prayers.lock().unwrap().insert(id, prayer.clone());
        Ok(())
    }

    async fn list_prayers(&self) -> Result<Vec<Prayer>> {
        let mut prayers: Vec<Prayer> = self.prayers.lock().unwrap().values().cloned().collect();
        prayers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(prayers)
    }

    async fn create_notice(&self, notice: &mut Notice) -> Result<()> {
        let id = Uuid::new_v4();
        notice.id = Some(id);
        self.notices.lock().unwrap().insert(id, notice.clone());
        debug!("Created notice: {} with id {}", notice.title, id);
        Ok(())
    }

    async fn list_notices(&self) -> Result<Vec<Notice>> {
        let mut notices: Vec<Notice> = self.notices.lock().unwrap().values().cloned().collect();
        notices.sort_by(|a, b| b.publish_on.cmp(&a.publish_on));
        Ok(notices)
    }

    async fn create_post(&self, post: &mut CommunityPost) -> Result<()> {
        let id = Uuid::new_v4();
        post.id = Some(id);
        self.posts.lock().unwrap().insert(id, post.clone());
        debug!("Created community post with id {}", id);
        Ok(())
    }

    async fn list_posts(&self) -> Result<Vec<CommunityPost>> {
        let mut posts: Vec<CommunityPost> = self.posts.lock().unwrap().values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn create_giving(&self, record: &mut GivingRecord) -> Result<()> {
        let id = Uuid::new_v4();
        record.id = Some(id);
        self.giving.lock().unwrap().insert(id, record.clone());
        debug!("Created giving record {} with id {}", record.reference, id);
        Ok(())
    }

    async fn get_giving_by_reference(&self, reference: &str) -> Result<Option<GivingRecord>> {
        let giving = self.giving.lock().unwrap();
        Ok(giving.values().find(|g| g.reference == reference).cloned())
    }

    async fn update_giving(&self, record: &GivingRecord) -> Result<()> {
        let id = require_id(record.id, "giving record")?;
        self.giving.lock().unwrap().insert(id, record.clone());
        debug!("Updated giving record {} with id {}", record.reference, id);
        Ok(())
    }

    async fn list_giving(&self, member_id: Option<Uuid>) -> Result<Vec<GivingRecord>> {
        let giving = self.giving.lock().unwrap();
        let mut records: Vec<GivingRecord> = giving
            .values()
            .filter(|g| member_id.map_or(true, |m| g.member_id == Some(m)))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn create_campaign(&self, campaign: &mut Campaign) -> Result<()> {
        let id = Uuid::new_v4();
        campaign.id = Some(id);
        self.campaigns.lock().unwrap().insert(id, campaign.clone());
        debug!("Created campaign: {} with id {}", campaign.name, id);
        Ok(())
    }

    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>> {
        Ok(self.campaigns.lock().unwrap().get(&id).cloned())
    }

    async fn create_pledge(&self, pledge: &mut Pledge) -> Result<()> {
        let id = Uuid::new_v4();
        pledge.id = Some(id);
        self.pledges.lock().unwrap().insert(id, pledge.clone());
        debug!("Created pledge with id {}", id);
        Ok(())
    }

    async fn update_pledge(&self, pledge: &Pledge) -> Result<()> {
        let id = require_id(pledge.id, "pledge")?;
        self.pledges.lock().unwrap().insert(id, pledge.clone());
        Ok(())
    }

    async fn list_pledges_for_campaign(&self, campaign_id: Uuid) -> Result<Vec<Pledge>> {
        let pledges = self.pledges.lock().unwrap();
        Ok(pledges
            .values()
            .filter(|p| p.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn create_sacrament_request(&self, request: &mut SacramentRequest) -> Result<()> {
        let id = Uuid::new_v4();
        request.id = Some(id);
        self.sacraments.lock().unwrap().insert(id, request.clone());
        debug!("Created sacrament request with id {}", id);
        Ok(())
    }

    async fn get_sacrament_request(&self, id: Uuid) -> Result<Option<SacramentRequest>> {
        Ok(self.sacraments.lock().unwrap().get(&id).cloned())
    }

    async fn update_sacrament_request(&self, request: &SacramentRequest) -> Result<()> {
        let id = require_id(request.id, "sacrament request")?;
        self.sacraments.lock().unwrap().insert(id, request.clone());
        debug!("Updated sacrament request {} -> {:?}", id, request.status);
        Ok(())
    }

    async fn list_sacrament_requests(&self, member_id: Option<Uuid>) -> Result<Vec<SacramentRequest>> {
        let sacraments = self.sacraments.lock().unwrap();
        let mut requests: Vec<SacramentRequest> = sacraments
            .values()
            .filter(|r| member_id.map_or(true, |m| r.member_id == m))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn create_device_token(&self, token: &mut DeviceToken) -> Result<()> {
        let id = Uuid::new_v4();
        token.id = Some(id);
        self.device_tokens.lock().unwrap().insert(id, token.clone());
        debug!("Registered device token for member {}", token.member_id);
        Ok(())
    }

    async fn list_device_tokens(&self) -> Result<Vec<DeviceToken>> {
        Ok(self.device_tokens.lock().unwrap().values().cloned().collect())
    }

    async fn create_notification(&self, notification: &mut Notification) -> Result<()> {
        let id = Uuid::new_v4();
        notification.id = Some(id);
        self.notifications.lock().unwrap().insert(id, notification.clone());
        debug!("Created notification: {} with id {}", notification.title, id);
        Ok(())
    }

    async fn update_notification(&self, notification: &Notification) -> Result<()> {
        let id = require_id(notification.id, "notification")?;
        self.notifications.lock().unwrap().insert(id, notification.clone());
        Ok(())
    }

    async fn list_queued_notifications(&self) -> Result<Vec<Notification>> {
        let notifications = self.notifications.lock().unwrap();
        let mut queued: Vec<Notification> =
            notifications.values().filter(|n| n.queued).cloned().collect();
        queued.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(queued)
    }
}
