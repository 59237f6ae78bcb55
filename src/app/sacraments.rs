use crate::domain::{SacramentRequest, SacramentRite, SacramentStatus};
use crate::error::{AppError, Result};
use crate::storage::Storage;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitSacramentRequest {
    pub member_id: Uuid,
    pub rite: SacramentRite,
    pub preferred_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub struct SacramentUseCase {
    storage: Arc<dyn Storage>,
}

impl SacramentUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn submit(&self, input: SubmitSacramentRequest) -> Result<SacramentRequest> {
        if self.storage.get_member(input.member_id).await?.is_none() {
            return Err(AppError::NotFound(format!("member {}", input.member_id)));
        }
        let now = Utc::now();
        let mut request = SacramentRequest {
            id: None,
            member_id: input.member_id,
            rite: input.rite,
            preferred_date: input.preferred_date,
            notes: input.notes,
            status: SacramentStatus::Submitted,
            created_at: now,
            updated_at: now,
        };
        self.storage.create_sacrament_request(&mut request).await?;
        info!("Sacrament request submitted: {:?} for member {}", request.rite, request.member_id);
        Ok(request)
    }

    /// Move a request to `next`, rejecting anything outside the fixed
    /// progression.
    pub async fn advance(&self, id: Uuid, next: SacramentStatus) -> Result<SacramentRequest> {
        let mut request = self
            .storage
            .get_sacrament_request(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("sacrament request {id}")))?;

        if !request.status.can_advance_to(next) {
            return Err(AppError::Validation(format!(
                "cannot move sacrament request from {:?} to {:?}",
                request.status, next
            )));
        }

        request.status = next;
        request.updated_at = Utc::now();
        self.storage.update_sacrament_request(&request).await?;
        info!("Sacrament request {} advanced to {:?}", id, next);
        Ok(request)
    }

    pub async fn list(&self, member_id: Option<Uuid>) -> Result<Vec<SacramentRequest>> {
        self.storage.list_sacrament_requests(member_id).await
    }
}
