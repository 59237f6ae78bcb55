use crate::domain::*;
use crate::error::{AppError, Result};
use crate::storage::Storage;
use async_trait::async_trait;
use libsql::{Builder, Connection, Database};
use std::env;
use tracing::info;
use uuid::Uuid;

/// Record kinds stored in the `records` table.
mod kind {
    pub const MEMBER: &str = "member";
    pub const SERMON: &str = "sermon";
    pub const PRAYER: &str = "prayer";
    pub const NOTICE: &str = "notice";
    pub const POST: &str = "post";
    pub const GIVING: &str = "giving";
    pub const CAMPAIGN: &str = "campaign";
    pub const PLEDGE: &str = "pledge";
    pub const SACRAMENT: &str = "sacrament";
    pub const DEVICE_TOKEN: &str = "device_token";
    pub const NOTIFICATION: &str = "notification";
}

/// Turso/libSQL-backed storage. Every entity is stored as a JSON document in
/// the `records` table keyed by uuid and kind; lookups on nested fields go
/// through json_extract.
pub struct LibsqlStorage {
    db: Database,
}

impl LibsqlStorage {
    /// Create a new storage handle connected to Turso
    pub async fn new() -> Result<Self> {
        let url = env::var("LIBSQL_URL").map_err(|_| AppError::Database {
            message: "LIBSQL_URL environment variable not set".to_string(),
        })?;

        let auth_token = env::var("LIBSQL_AUTH_TOKEN").map_err(|_| AppError::Database {
            message: "LIBSQL_AUTH_TOKEN environment variable not set".to_string(),
        })?;

        info!("Connecting to Turso database at {}", url);

        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database {
                message: format!("Failed to connect to database: {e}"),
            })?;

        Ok(Self { db })
    }

    async fn get_connection(&self) -> Result<Connection> {
        self.db.connect().map_err(|e| AppError::Database {
            message: format!("Failed to get database connection: {e}"),
        })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection().await?;
        let migration_sql = include_str!("../../migrations/001_create_records.sql");

        conn.execute_batch(migration_sql)
            .await
            .map_err(|e| AppError::Database {
                message: format!("Failed to run migrations: {e}"),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    async fn insert_record(&self, record_kind: &str, id: Uuid, data: &str) -> Result<()> {
        let conn = self.get_connection().await?;
        conn.execute(
            "INSERT INTO records (id, kind, data, created_at, updated_at) VALUES (?, ?, ?, datetime('now'), datetime('now'))",
            libsql::params![id.to_string(), record_kind, data],
        )
        .await
        .map_err(|e| AppError::Database {
            message: format!("Failed to insert {record_kind}: {e}"),
        })?;
        Ok(())
    }

    async fn replace_record(&self, record_kind: &str, id: Uuid, data: &str) -> Result<()> {
        let conn = self.get_connection().await?;
        conn.execute(
            "UPDATE records SET data = ?, updated_at = datetime('now') WHERE id = ? AND kind = ?",
            libsql::params![data, id.to_string(), record_kind],
        )
        .await
        .map_err(|e| AppError::Database {
            message: format!("Failed to update {record_kind}: {e}"),
        })?;
        Ok(())
    }

    async fn get_record(&self, record_kind: &str, id: Uuid) -> Result<Option<(String, String)>> {
        let conn = self.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, data FROM records WHERE id = ? AND kind = ?",
                libsql::params![id.to_string(), record_kind],
            )
            .await
            .map_err(|e| AppError::Database {
                message: format!("Failed to query {record_kind}: {e}"),
            })?;

        if let Some(row) = rows.next().await.map_err(|e| AppError::Database {
            message: format!("Failed to read row: {e}"),
        })? {
            Ok(Some(row_to_pair(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn list_records(&self, record_kind: &str) -> Result<Vec<(String, String)>> {
        let conn = self.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, data FROM records WHERE kind = ? ORDER BY created_at",
                libsql::params![record_kind],
            )
            .await
            .map_err(|e| AppError::Database {
                message: format!("Failed to query {record_kind} records: {e}"),
            })?;

        collect_pairs(&mut rows).await
    }

    /// Lookup records by a top-level JSON field equality match.
    async fn find_by_field(
        &self,
        record_kind: &str,
        json_path: &str,
        value: &str,
    ) -> Result<Vec<(String, String)>> {
        let conn = self.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, data FROM records WHERE kind = ? AND json_extract(data, ?) = ? ORDER BY created_at",
                libsql::params![record_kind, json_path, value],
            )
            .await
            .map_err(|e| AppError::Database {
                message: format!("Failed to query {record_kind} by {json_path}: {e}"),
            })?;

        collect_pairs(&mut rows).await
    }
}

fn row_to_pair(row: &libsql::Row) -> Result<(String, String)> {
    let id: String = row.get(0).map_err(|e| AppError::Database {
        message: format!("Failed to get id: {e}"),
    })?;
    let data: String = row.get(1).map_err(|e| AppError::Database {
        message: format!("Failed to get data: {e}"),
    })?;
    Ok((id, data))
}

async fn collect_pairs(rows: &mut libsql::Rows) -> Result<Vec<(String, String)>> {
    let mut results = Vec::new();
    while let Some(row) = rows.next().await.map_err(|e| AppError::Database {
        message: format!("Failed to read row: {e}"),
    })? {
        results.push(row_to_pair(&row)?);
    }
    Ok(results)
}

fn to_data<T: serde::Serialize>(entity: &T, what: &str) -> Result<String> {
    serde_json::to_string(entity).map_err(|e| AppError::Database {
        message: format!("Failed to serialize {what}: {e}"),
    })
}

fn from_data<T: serde::de::DeserializeOwned>(data: &str, what: &str) -> Result<T> {
    serde_json::from_str(data).map_err(|e| AppError::Database {
        message: format!("Failed to deserialize {what}: {e}"),
    })
}

fn id_of(entity_id: Option<Uuid>, what: &str) -> Result<Uuid> {
    entity_id.ok_or_else(|| AppError::Database {
        message: format!("Cannot update {what} without ID"),
    })
}

#[async_trait]
impl Storage for LibsqlStorage {
    async fn create_member(&self, member: &mut Member) -> Result<()> {
        let id = Uuid::new_v4();
        member.id = Some(id);
        self.insert_record(kind::MEMBER, id, &to_data(member, "member")?)
            .await
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
        match self.get_record(kind::MEMBER, id).await? {
            Some((_, data)) => Ok(Some(from_data(&data, "member")?)),
            None => Ok(None),
        }
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        self.list_records(kind::MEMBER)
            .await?
            .iter()
            .map(|(_, data)| from_data(data, "member"))
            .collect()
    }

    async fn create_sermon(&self, sermon: &mut Sermon) -> Result<()> {
        let id = Uuid::new_v4();
        sermon.id = Some(id);
        self.insert_record(kind::SERMON, id, &to_data(sermon, "sermon")?)
            .await
    }

    async fn get_sermon(&self, id: Uuid) -> Result<Option<Sermon>> {
        match self.get_record(kind::SERMON, id).await? {
            Some((_, data)) => Ok(Some(from_data(&data, "sermon")?)),
            None => Ok(None),
        }
    }

    async fn list_sermons(&self) -> Result<Vec<Sermon>> {
        let mut sermons: Vec<Sermon> = self
            .list_records(kind::SERMON)
            .await?
            .iter()
            .map(|(_, data)| from_data(data, "sermon"))
            .collect::<Result<_>>()?;
        sermons.sort_by(|a, b| b.delivered_on.cmp(&a.delivered_on));
        Ok(sermons)
    }

    async fn create_prayer(&self, prayer: &mut Prayer) -> Result<()> {
        let id = Uuid::new_v4();
        prayer.id = Some(id);
        self.insert_record(kind::PRAYER, id, &to_data(prayer, "prayer")?)
            .await
    }

    async fn get_prayer(&self, id: Uuid) -> Result<Option<Prayer>> {
        match self.get_record(kind::PRAYER, id).await? {
            Some((_, data)) => Ok(Some(from_data(&data, "prayer")?)),
            None => Ok(None),
        }
    }

    async fn update_prayer(&self, prayer: &Prayer) -> Result<()> {
        let id = id_of(prayer.id, "prayer")?;
        self.replace_record(kind::PRAYER, id, &to_data(prayer, "prayer")?).await
    }

    async fn list_prayers(&self) -> Result<Vec<Prayer>> {
        let mut prayers: Vec<Prayer> = self
            .list_records(kind::PRAYER)
            .await?
            .iter()
            .map(|(_, data)| from_data(data, "prayer"))
            .collect::<Result<_>>()?;
        prayers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(prayers)
    }

    async fn create_notice(&self, notice: &mut Notice) -> Result<()> {
        let id = Uuid::new_v4();
        notice.id = Some(id);
        self.insert_record(kind::NOTICE, id, &to_data(notice, "notice")?)
            .await
    }

    async fn list_notices(&self) -> Result<Vec<Notice>> {
        let mut notices: Vec<Notice> = self
            .list_records(kind::NOTICE)
            .await?
            .iter()
            .map(|(_, data)| from_data(data, "notice"))
            .collect::<Result<_>>()?;
        notices.sort_by(|a, b| b.publish_on.cmp(&a.publish_on));
        Ok(notices)
    }

    async fn create_post(&self, post: &mut CommunityPost) -> Result<()> {
        let id = Uuid::new_v4();
        post.id = Some(id);
        self.insert_record(kind::POST, id, &to_data(post, "post")?).await
    }

    async fn list_posts(&self) -> Result<Vec<CommunityPost>> {
        let mut posts: Vec<CommunityPost> = self
            .list_records(kind::POST)
            .await?
            .iter()
            .map(|(_, data)| from_data(data, "post"))
            .collect::<Result<_>>()?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn create_giving(&self, record: &mut GivingRecord) -> Result<()> {
        let id = Uuid::new_v4();
        record.id = Some(id);
        self.insert_record(kind::GIVING, id, &to_data(record, "giving record")?)
            .await
    }

    async fn get_giving_by_reference(&self, reference: &str) -> Result<Option<GivingRecord>> {
        let rows = self.find_by_field(kind::GIVING, "$.reference", reference).await?;
        match rows.first() {
            Some((_, data)) => Ok(Some(from_data(data, "giving record")?)),
            None => Ok(None),
        }
    }

    async fn update_giving(&self, record: &GivingRecord) -> Result<()> {
        let id = id_of(record.id, "giving record")?;
        self.replace_record(kind::GIVING, id, &to_data(record, "giving record")?).await
    }

    async fn list_giving(&self, member_id: Option<Uuid>) -> Result<Vec<GivingRecord>> {
        let rows = match member_id {
            Some(m) => {
                self.find_by_field(kind::GIVING, "$.member_id", &m.to_string())
                    .await?
            }
            None => self.list_records(kind::GIVING).await?,
        };
        let mut records: Vec<GivingRecord> = rows
            .iter()
            .map(|(_, data)| from_data(data, "giving record"))
            .collect::<Result<_>>()?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn create_campaign(&self, campaign: &mut Campaign) -> Result<()> {
        let id = Uuid::new_v4();
        campaign.id = Some(id);
        self.insert_record(kind::CAMPAIGN, id, &to_data(campaign, "campaign")?)
            .await
    }

    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>> {
        match self.get_record(kind::CAMPAIGN, id).await? {
            Some((_, data)) => Ok(Some(from_data(&data, "campaign")?)),
            None => Ok(None),
        }
    }

    async fn create_pledge(&self, pledge: &mut Pledge) -> Result<()> {
        let id = Uuid::new_v4();
        pledge.id = Some(id);
        self.insert_record(kind::PLEDGE, id, &to_data(pledge, "pledge")?)
            .await
    }

    async fn update_pledge(&self, pledge: &Pledge) -> Result<()> {
        let id = id_of(pledge.id, "pledge")?;
        self.replace_record(kind::PLEDGE, id, &to_data(pledge, "pledge")?).await
    }

    async fn list_pledges_for_campaign(&self, campaign_id: Uuid) -> Result<Vec<Pledge>> {
        self.find_by_field(kind::PLEDGE, "$.campaign_id", &campaign_id.to_string())
            .await?
            .iter()
            .map(|(_, data)| from_data(data, "pledge"))
            .collect()
    }

    async fn create_sacrament_request(&self, request: &mut SacramentRequest) -> Result<()> {
        let id = Uuid::new_v4();
        request.id = Some(id);
        self.insert_record(
            kind::SACRAMENT,
            id,
            &to_data(request, "sacrament request")?,
        )
        .await
    }

    async fn get_sacrament_request(&self, id: Uuid) -> Result<Option<SacramentRequest>> {
        match self.get_record(kind::SACRAMENT, id).await? {
            Some((_, data)) => Ok(Some(from_data(&data, "sacrament request")?)),
            None => Ok(None),
        }
    }

    async fn update_sacrament_request(&self, request: &SacramentRequest) -> Result<()> {
        let id = id_of(request.id, "sacrament request")?;
        self.replace_record(kind::SACRAMENT, id, &to_data(request, "sacrament request")?)
            .await
    }

    async fn list_sacrament_requests(&self, member_id: Option<Uuid>) -> Result<Vec<SacramentRequest>> {
        let rows = match member_id {
            Some(m) => {
                self.find_by_field(kind::SACRAMENT, "$.member_id", &m.to_string())
                    .await?
            }
            None => self.list_records(kind::SACRAMENT).await?,
        };
        let mut requests: Vec<SacramentRequest> = rows
            .iter()
            .map(|(_, data)| from_data(data, "sacrament request"))
            .collect::<Result<_>>()?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn create_device_token(&self, token: &mut DeviceToken) -> Result<()> {
        let id = Uuid::new_v4();
        token.id = Some(id);
        self.insert_record(kind::DEVICE_TOKEN, id, &to_data(token, "device token")?)
            .await
    }

    async fn list_device_tokens(&self) -> Result<Vec<DeviceToken>> {
        self.list_records(kind::DEVICE_TOKEN)
            .await?
            .iter()
            .map(|(_, data)| from_data(data, "device token"))
            .collect()
    }

    async fn create_notification(&self, notification: &mut Notification) -> Result<()> {
        let id = Uuid::new_v4();
        notification.id = Some(id);
        self.insert_record(
            kind::NOTIFICATION,
            id,
            &to_data(notification, "notification")?,
        )
        .await
    }

    async fn update_notification(&self, notification: &Notification) -> Result<()> {
        let id = id_of(notification.id, "notification")?;
        self.replace_record(kind::NOTIFICATION, id, &to_data(notification, "notification")?)
            .await
    }

    async fn list_queued_notifications(&self) -> Result<Vec<Notification>> {
        let conn = self.get_connection().await?;
        // json booleans come back as 1/0 from json_extract
        let mut rows = conn
            .query(
                "SELECT id, data FROM records WHERE kind = ? AND json_extract(data, '$.queued') = 1 ORDER BY created_at",
                libsql::params![kind::NOTIFICATION],
            )
            .await
            .map_err(|e| AppError::Database {
                message: format!("Failed to query queued notifications: {e}"),
            })?;

        collect_pairs(&mut rows)
            .await?
            .iter()
            .map(|(_, data)| from_data(data, "notification"))
            .collect()
    }
}
