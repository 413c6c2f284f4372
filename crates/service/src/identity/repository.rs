use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Credentials, ProfileColumns, ShopInput, ShopProfile, StoredUser};
use super::errors::IdentityError;

/// Repository abstraction for identity persistence.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn find_user_by_email(&self, normalized_email: &str) -> Result<Option<StoredUser>, IdentityError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, IdentityError>;

    /// Persist the whole sign-up in one step: the vendor shop when present,
    /// the user row, and the hashed credentials. A failure on any of the
    /// three leaves no partial account behind.
    async fn create_account(
        &self,
        user: StoredUser,
        password_hash: String,
        password_algorithm: String,
        shop: Option<ShopInput>,
    ) -> Result<(StoredUser, Option<ShopProfile>), IdentityError>;

    /// Overwrite the PII columns with pre-merged ciphertext values and
    /// return the reloaded row.
    async fn update_profile(&self, id: Uuid, columns: ProfileColumns) -> Result<StoredUser, IdentityError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, IdentityError>;
    async fn upsert_password(
        &self,
        user_id: Uuid,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<Credentials, IdentityError>;

    async fn find_shop_by_owner(&self, user_id: Uuid) -> Result<Option<ShopProfile>, IdentityError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockIdentityRepository {
        users: Mutex<HashMap<Uuid, StoredUser>>,
        creds: Mutex<HashMap<Uuid, Credentials>>,
        shops: Mutex<HashMap<Uuid, ShopProfile>>, // key: owner user_id
    }

    #[async_trait]
    impl IdentityRepository for MockIdentityRepository {
        async fn find_user_by_email(&self, normalized_email: &str) -> Result<Option<StoredUser>, IdentityError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.email == normalized_email).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, IdentityError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&id).cloned())
        }

        async fn create_account(
            &self,
            user: StoredUser,
            password_hash: String,
            password_algorithm: String,
            shop: Option<ShopInput>,
        ) -> Result<(StoredUser, Option<ShopProfile>), IdentityError> {
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.email == user.email) {
                return Err(IdentityError::Conflict("This email is already in use.".into()));
            }
            // Same constraint the shop store enforces; failing here must
            // leave no user behind, so check before inserting anything.
            let created_shop = match shop {
                Some(input) => {
                    if input.name.trim().is_empty() {
                        return Err(IdentityError::Repository("shop name required".into()));
                    }
                    let now = Utc::now();
                    let profile = ShopProfile {
                        id: Uuid::new_v4(),
                        user_id: user.id,
                        name: input.name,
                        description: input.description,
                        address: input.address,
                        image: input.image,
                        location: input.location,
                        delivery_range: input.delivery_range,
                        status: 1,
                        created_at: now,
                        updated_at: now,
                    };
                    self.shops.lock().unwrap().insert(user.id, profile.clone());
                    Some(profile)
                }
                None => None,
            };
            users.insert(user.id, user.clone());
            self.creds.lock().unwrap().insert(
                user.id,
                Credentials { user_id: user.id, password_hash, password_algorithm },
            );
            Ok((user, created_shop))
        }

        async fn update_profile(&self, id: Uuid, columns: ProfileColumns) -> Result<StoredUser, IdentityError> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .get_mut(&id)
                .ok_or_else(|| IdentityError::NotFound("User not found".into()))?;
            user.first_name = columns.first_name;
            user.last_name = columns.last_name;
            user.address_street = columns.address_street;
            user.address_city = columns.address_city;
            user.address_province = columns.address_province;
            Ok(user.clone())
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, IdentityError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(
            &self,
            user_id: Uuid,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<Credentials, IdentityError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }

        async fn find_shop_by_owner(&self, user_id: Uuid) -> Result<Option<ShopProfile>, IdentityError> {
            let shops = self.shops.lock().unwrap();
            Ok(shops.get(&user_id).cloned())
        }
    }
}
