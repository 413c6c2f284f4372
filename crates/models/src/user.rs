use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;

pub const USER_TYPE_BUYER: i16 = 1;
pub const USER_TYPE_VENDOR: i16 = 2;
pub const STATUS_ACTIVE: i16 = 1;

/// Account row. `first_name`, `last_name` and the address columns hold
/// ciphertext produced by the PII field cipher, never plaintext.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_type: i16,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address_street: String,
    pub address_city: String,
    pub address_province: String,
    pub status: i16,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new account; PII fields must already be encrypted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub user_type: i16,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address_street: String,
    pub address_city: String,
    pub address_province: String,
}

pub fn validate_user_type(user_type: i16) -> Result<(), errors::ModelError> {
    if user_type != USER_TYPE_BUYER && user_type != USER_TYPE_VENDOR {
        return Err(errors::ModelError::Validation("User type is invalid.".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let trimmed = email.trim();
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    let ok = !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !trimmed.contains(char::is_whitespace);
    if !ok {
        return Err(errors::ModelError::Validation("Email is invalid.".into()));
    }
    Ok(())
}

/// Canonical form used as the uniqueness key: trimmed, lowercased; gmail
/// addresses additionally lose dots and any `+tag` in the local part.
pub fn normalize_email(email: &str) -> String {
    let lower = email.trim().to_lowercase();
    let Some((local, domain)) = lower.split_once('@') else {
        return lower;
    };
    if domain == "gmail.com" || domain == "googlemail.com" {
        // Only gmail ignores dots and +tags; elsewhere they are significant
        // and distinct addresses must stay distinct.
        let local = local.split('+').next().unwrap_or(local);
        let local: String = local.chars().filter(|c| *c != '.').collect();
        format!("{local}@{domain}")
    } else {
        format!("{local}@{domain}")
    }
}

pub async fn create(db: &DatabaseConnection, new: NewUser) -> Result<Model, errors::ModelError> {
    validate_user_type(new.user_type)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(new.id),
        user_type: Set(new.user_type),
        email: Set(new.email),
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        address_street: Set(new.address_street),
        address_city: Set(new.address_city),
        address_province: Set(new.address_province),
        status: Set(STATUS_ACTIVE),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_email(db: &DatabaseConnection, normalized_email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(normalized_email))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_bounds() {
        assert!(validate_user_type(1).is_ok());
        assert!(validate_user_type(2).is_ok());
        assert!(validate_user_type(0).is_err());
        assert!(validate_user_type(3).is_err());
    }

    #[test]
    fn email_format() {
        assert!(validate_email("max@example.com").is_ok());
        assert!(validate_email("a.b+tag@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("x@nodot").is_err());
        assert!(validate_email("x y@example.com").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn normalization_lowercases_and_trims() {
        assert_eq!(normalize_email("  Max@Example.COM "), "max@example.com");
    }

    #[test]
    fn normalization_gmail_dots_and_tags() {
        assert_eq!(normalize_email("M.a.x+x@GMail.com"), "max@gmail.com");
        assert_eq!(normalize_email("max+promo@googlemail.com"), "max@googlemail.com");
    }

    #[test]
    fn normalization_preserves_local_part_outside_gmail() {
        // dots and +tags are significant for other providers
        assert_eq!(normalize_email("m.ax@example.com"), "m.ax@example.com");
        assert_eq!(normalize_email("max+promo@example.com"), "max+promo@example.com");
    }
}
