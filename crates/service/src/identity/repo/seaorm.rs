use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use uuid::Uuid;

use crate::identity::domain::{Credentials, ProfileColumns, ShopInput, ShopProfile, StoredUser};
use crate::identity::errors::IdentityError;
use crate::identity::repository::IdentityRepository;

pub struct SeaOrmIdentityRepository {
    pub db: DatabaseConnection,
}

fn to_stored(u: models::user::Model) -> StoredUser {
    StoredUser {
        id: u.id,
        user_type: u.user_type,
        email: u.email,
        first_name: u.first_name,
        last_name: u.last_name,
        address_street: u.address_street,
        address_city: u.address_city,
        address_province: u.address_province,
        status: u.status,
    }
}

fn to_shop_profile(s: models::shop::Model) -> ShopProfile {
    ShopProfile {
        id: s.id,
        user_id: s.user_id,
        name: s.name,
        description: s.description,
        address: s.address,
        image: s.image,
        location: crate::identity::domain::GeoPoint { lat: s.lat, lng: s.lng },
        delivery_range: s.delivery_range,
        status: s.status,
        created_at: s.created_at.with_timezone(&Utc),
        updated_at: s.updated_at.with_timezone(&Utc),
    }
}

#[async_trait::async_trait]
impl IdentityRepository for SeaOrmIdentityRepository {
    async fn find_user_by_email(&self, normalized_email: &str) -> Result<Option<StoredUser>, IdentityError> {
        let found = models::user::find_by_email(&self.db, normalized_email)
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?;
        Ok(found.map(to_stored))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, IdentityError> {
        let found = models::user::find_by_id(&self.db, id)
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?;
        Ok(found.map(to_stored))
    }

    async fn create_account(
        &self,
        user: StoredUser,
        password_hash: String,
        password_algorithm: String,
        shop: Option<ShopInput>,
    ) -> Result<(StoredUser, Option<ShopProfile>), IdentityError> {
        // One transaction for shop, user and credentials so a failure on any
        // write leaves no partial account.
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?;

        let now = Utc::now().into();
        let user_am = models::user::ActiveModel {
            id: Set(user.id),
            user_type: Set(user.user_type),
            email: Set(user.email.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            address_street: Set(user.address_street.clone()),
            address_city: Set(user.address_city.clone()),
            address_province: Set(user.address_province.clone()),
            status: Set(models::user::STATUS_ACTIVE),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = user_am.insert(&txn).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") {
                IdentityError::Conflict("This email is already in use.".into())
            } else {
                IdentityError::Repository(msg)
            }
        })?;

        let created_shop = match shop {
            Some(input) => {
                if input.name.trim().is_empty() {
                    txn.rollback()
                        .await
                        .map_err(|e| IdentityError::Repository(e.to_string()))?;
                    return Err(IdentityError::Repository("shop name required".into()));
                }
                let shop_am = models::shop::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(created.id),
                    name: Set(input.name),
                    description: Set(input.description),
                    address: Set(input.address),
                    image: Set(input.image),
                    lat: Set(input.location.lat),
                    lng: Set(input.location.lng),
                    delivery_range: Set(input.delivery_range),
                    status: Set(models::shop::STATUS_ACTIVE),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                let s = shop_am
                    .insert(&txn)
                    .await
                    .map_err(|e| IdentityError::Repository(e.to_string()))?;
                Some(to_shop_profile(s))
            }
            None => None,
        };

        let cred_am = models::user_credentials::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(created.id),
            password_hash: Set(password_hash),
            password_algorithm: Set(password_algorithm),
            created_at: Set(now),
            updated_at: Set(now),
        };
        cred_am
            .insert(&txn)
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?;
        Ok((to_stored(created), created_shop))
    }

    async fn update_profile(&self, id: Uuid, columns: ProfileColumns) -> Result<StoredUser, IdentityError> {
        let found = models::user::find_by_id(&self.db, id)
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?
            .ok_or_else(|| IdentityError::NotFound("User not found".into()))?;
        let mut am: models::user::ActiveModel = found.into();
        am.first_name = Set(columns.first_name);
        am.last_name = Set(columns.last_name);
        am.address_street = Set(columns.address_street);
        am.address_city = Set(columns.address_city);
        am.address_province = Set(columns.address_province);
        am.updated_at = Set(Utc::now().into());
        let updated = am
            .update(&self.db)
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?;
        Ok(to_stored(updated))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, IdentityError> {
        let found = models::user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?;
        Ok(found.map(|c| Credentials {
            user_id: c.user_id,
            password_hash: c.password_hash,
            password_algorithm: c.password_algorithm,
        }))
    }

    async fn upsert_password(
        &self,
        user_id: Uuid,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<Credentials, IdentityError> {
        let c = models::user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?;
        Ok(Credentials {
            user_id: c.user_id,
            password_hash: c.password_hash,
            password_algorithm: c.password_algorithm,
        })
    }

    async fn find_shop_by_owner(&self, user_id: Uuid) -> Result<Option<ShopProfile>, IdentityError> {
        let found = models::shop::find_by_owner(&self.db, user_id)
            .await
            .map_err(|e| IdentityError::Repository(e.to_string()))?;
        Ok(found.map(to_shop_profile))
    }
}
