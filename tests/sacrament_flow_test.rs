mod common;

use anyhow::Result;
use common::{seed_member, storage};
use parish_hub::app::sacraments::{SacramentUseCase, SubmitSacramentRequest};
use parish_hub::domain::{SacramentRite, SacramentStatus};
use parish_hub::error::AppError;
use uuid::Uuid;

fn submission(member_id: Uuid) -> SubmitSacramentRequest {
    SubmitSacramentRequest {
        member_id,
        rite: SacramentRite::Baptism,
        preferred_date: None,
        notes: Some("infant baptism for our daughter".to_string()),
    }
}

#[tokio::test]
async fn request_walks_the_full_progression() -> Result<()> {
    let storage = storage();
    let member = seed_member(&storage, "Esi Owusu", None).await;
    let sacraments = SacramentUseCase::new(storage.clone());

    let request = sacraments.submit(submission(member)).await?;
    assert_eq!(request.status, SacramentStatus::Submitted);
    let id = request.id.unwrap();

    let request = sacraments.advance(id, SacramentStatus::UnderReview).await?;
    assert_eq!(request.status, SacramentStatus::UnderReview);
    let request = sacraments.advance(id, SacramentStatus::Approved).await?;
    assert_eq!(request.status, SacramentStatus::Approved);
    let request = sacraments.advance(id, SacramentStatus::Completed).await?;
    assert_eq!(request.status, SacramentStatus::Completed);
    assert!(request.updated_at >= request.created_at);
    Ok(())
}

#[tokio::test]
async fn review_can_end_in_rejection() -> Result<()> {
    let storage = storage();
    let member = seed_member(&storage, "Yaw Darko", None).await;
    let sacraments = SacramentUseCase::new(storage.clone());

    let request = sacraments.submit(submission(member)).await?;
    let id = request.id.unwrap();
    sacraments.advance(id, SacramentStatus::UnderReview).await?;
    let request = sacraments.advance(id, SacramentStatus::Rejected).await?;
    assert_eq!(request.status, SacramentStatus::Rejected);

    // Rejection is terminal
    let err = sacraments.advance(id, SacramentStatus::UnderReview).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn progression_cannot_skip_review() -> Result<()> {
    let storage = storage();
    let member = seed_member(&storage, "Adwoa Asante", None).await;
    let sacraments = SacramentUseCase::new(storage.clone());

    let request = sacraments.submit(submission(member)).await?;
    let id = request.id.unwrap();

    for illegal in [
        SacramentStatus::Approved,
        SacramentStatus::Rejected,
        SacramentStatus::Completed,
    ] {
        let err = sacraments.advance(id, illegal).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "skipping to {illegal:?} must fail");
    }
    Ok(())
}

#[tokio::test]
async fn submission_requires_a_known_member() {
    let sacraments = SacramentUseCase::new(storage());
    let err = sacraments.submit(submission(Uuid::new_v4())).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn listing_filters_by_member() -> Result<()> {
    let storage = storage();
    let a = seed_member(&storage, "Member A", None).await;
    let b = seed_member(&storage, "Member B", None).await;
    let sacraments = SacramentUseCase::new(storage.clone());
    sacraments.submit(submission(a)).await?;
    sacraments.submit(submission(b)).await?;

    assert_eq!(sacraments.list(None).await?.len(), 2);
    let only_a = sacraments.list(Some(a)).await?;
    assert_eq!(only_a.len(), 1);
    assert_eq!(only_a[0].member_id, a);
    Ok(())
}
