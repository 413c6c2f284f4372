//! Shop profile read/update for the authenticated owner.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::shop;

use crate::errors::ServiceError;
use crate::identity::domain::GeoPoint;

/// Update payload. Text fields fall back to the stored value when empty or
/// omitted; the location is always overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub location: GeoPoint,
}

pub async fn shop_details(db: &DatabaseConnection, owner_id: Uuid) -> Result<shop::Model, ServiceError> {
    shop::find_by_owner(db, owner_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Shop"))
}

pub async fn update_shop(
    db: &DatabaseConnection,
    owner_id: Uuid,
    update: ShopUpdate,
) -> Result<shop::Model, ServiceError> {
    let current = shop::find_by_owner(db, owner_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Shop"))?;

    let name = fallback(update.name.as_deref(), &current.name);
    let description = fallback(update.description.as_deref(), &current.description);
    let address = fallback(update.address.as_deref(), &current.address);

    let mut am: shop::ActiveModel = current.into();
    am.name = Set(name);
    am.description = Set(description);
    am.address = Set(address);
    // location has no fallback; whatever the caller sent wins
    am.lat = Set(update.location.lat);
    am.lng = Set(update.location.lng);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(updated)
}

/// Falsy-fallback rule: an empty or missing value keeps what is stored.
fn fallback(incoming: Option<&str>, current: &str) -> String {
    match incoming {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => current.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, vendor_with_shop};
    use sea_orm::EntityTrait;

    #[test]
    fn fallback_rules() {
        assert_eq!(fallback(Some("New"), "Old"), "New");
        assert_eq!(fallback(Some(""), "Old"), "Old");
        assert_eq!(fallback(None, "Old"), "Old");
    }

    #[tokio::test]
    async fn update_merges_per_field() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (vendor, created) = vendor_with_shop(&db).await?;

        let updated = update_shop(
            &db,
            vendor.id,
            ShopUpdate {
                name: Some(String::new()),
                description: Some("New desc".into()),
                address: None,
                location: GeoPoint { lat: 1.0, lng: 2.0 },
            },
        )
        .await?;
        assert_eq!(updated.name, created.name); // fallback
        assert_eq!(updated.description, "New desc"); // replaced
        assert_eq!(updated.address, created.address); // fallback
        assert_eq!((updated.lat, updated.lng), (1.0, 2.0)); // always replaced

        models::user::Entity::delete_by_id(vendor.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn details_for_unknown_owner() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let err = shop_details(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }
}
