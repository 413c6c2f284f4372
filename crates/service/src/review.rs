//! Reviews: at most one per (coffee bean, reviewer), with reviewer display
//! fields resolved — and decrypted — at read time rather than stored on the
//! review row.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::crypto::FieldCipher;
use models::errors::ModelError;
use models::{coffee_bean, review, user};

use crate::errors::ServiceError;

/// Public reviewer identity attached to each review response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerInfo {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewView {
    #[serde(rename = "coffeeBeanId")]
    pub coffee_bean_id: Uuid,
    pub rating: i16,
    pub comment: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub user: ReviewerInfo,
}

async fn enrich(db: &DatabaseConnection, cipher: &FieldCipher, r: review::Model) -> Result<ReviewView, ServiceError> {
    let reviewer = user::find_by_id(db, r.user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))?;
    Ok(ReviewView {
        coffee_bean_id: r.coffee_bean_id,
        rating: r.rating,
        comment: r.comment,
        created_at: r.created_at.with_timezone(&Utc),
        updated_at: r.updated_at.with_timezone(&Utc),
        user: ReviewerInfo {
            user_id: reviewer.id,
            first_name: cipher.decrypt(&reviewer.first_name)?,
            last_name: cipher.decrypt(&reviewer.last_name)?,
        },
    })
}

async fn require_bean(db: &DatabaseConnection, bean_id: Uuid) -> Result<coffee_bean::Model, ServiceError> {
    coffee_bean::find_by_id(db, bean_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Coffee bean does not exist".into()))
}

/// All reviews for one coffee bean, public.
pub async fn list_reviews(
    db: &DatabaseConnection,
    cipher: &FieldCipher,
    bean_id: Uuid,
) -> Result<Vec<ReviewView>, ServiceError> {
    require_bean(db, bean_id).await?;
    let rows = review::find_by_bean(db, bean_id).await?;
    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        views.push(enrich(db, cipher, row).await?);
    }
    Ok(views)
}

pub async fn create_review(
    db: &DatabaseConnection,
    cipher: &FieldCipher,
    user_id: Uuid,
    bean_id: Uuid,
    rating: i16,
    comment: Option<String>,
) -> Result<ReviewView, ServiceError> {
    review::validate_rating(rating).map_err(|e| ServiceError::Validation(e.to_string()))?;
    require_bean(db, bean_id).await?;
    if review::find_by_bean_and_user(db, bean_id, user_id).await?.is_some() {
        return Err(ServiceError::Conflict("You already reviewed this coffee bean.".into()));
    }

    let created = review::create(db, bean_id, user_id, rating, comment.unwrap_or_default())
        .await
        .map_err(|e| match e {
            // A concurrent duplicate slips past the check above and lands on
            // the unique index instead.
            ModelError::Db(msg) if msg.contains("duplicate key") => {
                ServiceError::Conflict("You already reviewed this coffee bean.".into())
            }
            other => other.into(),
        })?;
    enrich(db, cipher, created).await
}

pub async fn update_review(
    db: &DatabaseConnection,
    cipher: &FieldCipher,
    user_id: Uuid,
    bean_id: Uuid,
    rating: i16,
    comment: Option<String>,
) -> Result<ReviewView, ServiceError> {
    review::validate_rating(rating).map_err(|e| ServiceError::Validation(e.to_string()))?;
    require_bean(db, bean_id).await?;
    let existing = review::find_by_bean_and_user(db, bean_id, user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Review does not exist".into()))?;

    let mut am: review::ActiveModel = existing.into();
    am.rating = Set(rating);
    am.comment = Set(comment.unwrap_or_default());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    enrich(db, cipher, updated).await
}

pub async fn delete_review(db: &DatabaseConnection, user_id: Uuid, bean_id: Uuid) -> Result<(), ServiceError> {
    let existing = review::find_by_bean_and_user(db, bean_id, user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Review does not exist".into()))?;
    review::Entity::delete_by_id(existing.id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}
