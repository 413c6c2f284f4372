use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use common::crypto::FieldCipher;
use models::user::{normalize_email, validate_email, validate_user_type, USER_TYPE_VENDOR};

use super::domain::{
    Address, ProfileColumns, ProfileUpdate, Session, SignInInput, SignUpInput, StoredUser,
    UserProfile,
};
use super::errors::IdentityError;
use super::repository::IdentityRepository;

/// Tokens issued at sign-up and sign-in both live this long.
const TOKEN_TTL_DAYS: i64 = 7;

const MIN_PASSWORD_LEN: usize = 6;

/// Identity service configuration
#[derive(Clone)]
pub struct IdentityConfig {
    pub jwt_secret: String,
    pub password_algorithm: String,
}

#[derive(serde::Serialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Identity business service independent of web framework
pub struct IdentityService<R: IdentityRepository> {
    repo: Arc<R>,
    cipher: FieldCipher,
    cfg: IdentityConfig,
}

impl<R: IdentityRepository> IdentityService<R> {
    pub fn new(repo: Arc<R>, cipher: FieldCipher, cfg: IdentityConfig) -> Self {
        Self { repo, cipher, cfg }
    }

    /// Create a new account, and a shop alongside it for vendors.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use common::crypto::{generate_base64_key, FieldCipher};
    /// use service::identity::domain::{AddressInput, SignUpInput};
    /// use service::identity::repository::mock::MockIdentityRepository;
    /// use service::identity::service::{IdentityConfig, IdentityService};
    /// let repo = Arc::new(MockIdentityRepository::default());
    /// let cipher = FieldCipher::from_base64_key(&generate_base64_key()).unwrap();
    /// let svc = IdentityService::new(repo, cipher, IdentityConfig { jwt_secret: "secret".into(), password_algorithm: "argon2".into() });
    /// let input = SignUpInput {
    ///     email: "Max@Example.com".into(),
    ///     password: "secret1".into(),
    ///     user_type: 1,
    ///     first_name: "Max".into(),
    ///     last_name: "Martin".into(),
    ///     address: AddressInput { street: "1 Main".into(), city: "Montreal".into(), province: "QC".into() },
    ///     shop: None,
    /// };
    /// let session = tokio_test::block_on(svc.sign_up(input)).unwrap();
    /// assert_eq!(session.user.email, "max@example.com");
    /// assert!(session.shop.is_none());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, user_type = input.user_type))]
    pub async fn sign_up(&self, input: SignUpInput) -> Result<Session, IdentityError> {
        validate_user_type(input.user_type)
            .map_err(|_| IdentityError::Validation("User type is invalid.".into()))?;
        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(IdentityError::Validation(
                "Your first name and last name are required.".into(),
            ));
        }
        validate_email(&input.email)
            .map_err(|_| IdentityError::Validation("Email is invalid.".into()))?;
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(IdentityError::Validation(
                "Password must be at least 6 characters long.".into(),
            ));
        }

        let normalized = normalize_email(&input.email);
        if let Some(existing) = self.repo.find_user_by_email(&normalized).await? {
            debug!(user_id = %existing.id, "email already taken");
            return Err(IdentityError::Conflict("This email is already in use.".into()));
        }

        let shop = if input.user_type == USER_TYPE_VENDOR {
            match input.shop {
                Some(shop) => Some(shop),
                None => {
                    return Err(IdentityError::Validation(
                        "Please enter your shop's details.".into(),
                    ))
                }
            }
        } else {
            None
        };

        let user_id = Uuid::new_v4();
        let stored = StoredUser {
            id: user_id,
            user_type: input.user_type,
            email: normalized,
            first_name: self.cipher.encrypt(&input.first_name)?,
            last_name: self.cipher.encrypt(&input.last_name)?,
            address_street: self.cipher.encrypt(&input.address.street)?,
            address_city: self.cipher.encrypt(&input.address.city)?,
            address_province: self.cipher.encrypt(&input.address.province)?,
            status: 1,
        };
        let hash = self.hash_password(&input.password)?;

        let (created, created_shop) = self
            .repo
            .create_account(stored, hash, self.cfg.password_algorithm.clone(), shop)
            .await?;

        let token = self.sign_token(created.id)?;
        let user = self.present(&created)?;
        info!(user_id = %created.id, user_type = created.user_type, "user_signed_up");
        Ok(Session { user, shop: created_shop, token })
    }

    /// Verify credentials and issue a session token.
    ///
    /// A missing account and a wrong password produce the same error so the
    /// endpoint cannot be used to probe which emails are registered.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use common::crypto::{generate_base64_key, FieldCipher};
    /// use service::identity::domain::{AddressInput, SignInInput, SignUpInput};
    /// use service::identity::repository::mock::MockIdentityRepository;
    /// use service::identity::service::{IdentityConfig, IdentityService};
    /// let repo = Arc::new(MockIdentityRepository::default());
    /// let cipher = FieldCipher::from_base64_key(&generate_base64_key()).unwrap();
    /// let svc = IdentityService::new(repo, cipher, IdentityConfig { jwt_secret: "secret".into(), password_algorithm: "argon2".into() });
    /// let input = SignUpInput {
    ///     email: "max@example.com".into(),
    ///     password: "secret1".into(),
    ///     user_type: 1,
    ///     first_name: "Max".into(),
    ///     last_name: "Martin".into(),
    ///     address: AddressInput { street: "1 Main".into(), city: "Montreal".into(), province: "QC".into() },
    ///     shop: None,
    /// };
    /// tokio_test::block_on(svc.sign_up(input)).unwrap();
    /// let session = tokio_test::block_on(svc.sign_in(SignInInput { email: "max@example.com".into(), password: "secret1".into() })).unwrap();
    /// assert_eq!(session.user.first_name, "Max");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_in(&self, input: SignInInput) -> Result<Session, IdentityError> {
        validate_email(&input.email)
            .map_err(|_| IdentityError::Validation("Email is invalid.".into()))?;
        let normalized = normalize_email(&input.email);

        let user = self
            .repo
            .find_user_by_email(&normalized)
            .await?
            .ok_or_else(generic_credentials_error)?;
        let cred = self
            .repo
            .get_credentials(user.id)
            .await?
            .ok_or_else(generic_credentials_error)?;
        if !verify_password(&cred.password_hash, &input.password)? {
            return Err(generic_credentials_error());
        }

        let token = self.sign_token(user.id)?;
        let shop = if user.user_type == USER_TYPE_VENDOR {
            self.repo.find_shop_by_owner(user.id).await?
        } else {
            None
        };
        info!(user_id = %user.id, "user_signed_in");
        Ok(Session { user: self.present(&user)?, shop, token })
    }

    /// Current account, decrypted for presentation.
    pub async fn me(&self, user_id: Uuid) -> Result<UserProfile, IdentityError> {
        let user = self
            .repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| IdentityError::NotFound("User not found".into()))?;
        self.present(&user)
    }

    /// Replace non-empty incoming fields (re-encrypted), retain the rest.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<UserProfile, IdentityError> {
        let current = self
            .repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| IdentityError::NotFound("User not found".into()))?;

        let (street, city, province) = match update.address {
            Some(addr) => (
                self.replace_or_retain(addr.street.as_deref(), &current.address_street)?,
                self.replace_or_retain(addr.city.as_deref(), &current.address_city)?,
                self.replace_or_retain(addr.province.as_deref(), &current.address_province)?,
            ),
            None => (
                current.address_street.clone(),
                current.address_city.clone(),
                current.address_province.clone(),
            ),
        };
        let columns = ProfileColumns {
            first_name: self.replace_or_retain(update.first_name.as_deref(), &current.first_name)?,
            last_name: self.replace_or_retain(update.last_name.as_deref(), &current.last_name)?,
            address_street: street,
            address_city: city,
            address_province: province,
        };

        let updated = self.repo.update_profile(user_id, columns).await?;
        self.present(&updated)
    }

    /// Swap the stored hash after verifying the old password.
    ///
    /// Note: unlike sign-up, no length rule is applied to the new password.
    /// See DESIGN.md for the flagged inconsistency.
    #[instrument(skip(self, old_password, new_password), fields(user_id = %user_id))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        let cred = self
            .repo
            .get_credentials(user_id)
            .await?
            .ok_or_else(|| IdentityError::Unauthorized("Password does not match.".into()))?;
        if !verify_password(&cred.password_hash, old_password)? {
            return Err(IdentityError::Unauthorized("Password does not match.".into()));
        }
        let hash = self.hash_password(new_password)?;
        self.repo
            .upsert_password(user_id, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %user_id, "password_changed");
        Ok(())
    }

    fn hash_password(&self, plaintext: &str) -> Result<String, IdentityError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| IdentityError::Hash(e.to_string()))?
            .to_string())
    }

    fn sign_token(&self, user_id: Uuid) -> Result<String, IdentityError> {
        let exp = (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;
        let claims = Claims { sub: user_id.to_string(), exp };
        encode(
            &JwtHeader::default(),
            &claims,
            &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
        )
        .map_err(|e| IdentityError::Token(e.to_string()))
    }

    // Same falsy rule as the shop update: only a present, non-empty value
    // replaces what is stored.
    fn replace_or_retain(&self, incoming: Option<&str>, current_ciphertext: &str) -> Result<String, IdentityError> {
        match incoming {
            Some(value) if !value.is_empty() => Ok(self.cipher.encrypt(value)?),
            _ => Ok(current_ciphertext.to_string()),
        }
    }

    fn present(&self, user: &StoredUser) -> Result<UserProfile, IdentityError> {
        Ok(UserProfile {
            id: user.id,
            user_type: user.user_type,
            email: user.email.clone(),
            first_name: self.cipher.decrypt(&user.first_name)?,
            last_name: self.cipher.decrypt(&user.last_name)?,
            address: Address {
                street: self.cipher.decrypt(&user.address_street)?,
                city: self.cipher.decrypt(&user.address_city)?,
                province: self.cipher.decrypt(&user.address_province)?,
            },
            status: user.status,
        })
    }
}

fn generic_credentials_error() -> IdentityError {
    IdentityError::Unauthorized("Email or password is incorrect.".into())
}

fn verify_password(hash: &str, plaintext: &str) -> Result<bool, IdentityError> {
    let parsed = PasswordHash::new(hash).map_err(|e| IdentityError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::domain::{AddressInput, AddressUpdate, GeoPoint, ShopInput};
    use crate::identity::repository::mock::MockIdentityRepository;
    use common::crypto::generate_base64_key;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    const SECRET: &str = "test-secret";

    fn svc() -> IdentityService<MockIdentityRepository> {
        let repo = Arc::new(MockIdentityRepository::default());
        let cipher = FieldCipher::from_base64_key(&generate_base64_key()).unwrap();
        IdentityService::new(
            repo,
            cipher,
            IdentityConfig { jwt_secret: SECRET.into(), password_algorithm: "argon2".into() },
        )
    }

    fn buyer_input(email: &str) -> SignUpInput {
        SignUpInput {
            email: email.into(),
            password: "secret1".into(),
            user_type: 1,
            first_name: "Max".into(),
            last_name: "Martin".into(),
            address: AddressInput {
                street: "1 Main".into(),
                city: "Montreal".into(),
                province: "QC".into(),
            },
            shop: None,
        }
    }

    fn shop_input() -> ShopInput {
        ShopInput {
            name: "Bean Palace".into(),
            description: "Fresh roasts".into(),
            address: "123 St".into(),
            image: String::new(),
            location: GeoPoint { lat: 45.5, lng: -73.6 },
            delivery_range: 10.0,
        }
    }

    #[derive(serde::Deserialize)]
    struct TokenClaims {
        sub: String,
        #[allow(dead_code)]
        exp: usize,
    }

    fn token_subject(token: &str) -> String {
        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        data.claims.sub
    }

    #[tokio::test]
    async fn sign_up_normalizes_email_and_rejects_duplicates() {
        let svc = svc();
        let session = svc.sign_up(buyer_input("  M.ax+deals@GMail.com ")).await.unwrap();
        assert_eq!(session.user.email, "max@gmail.com");

        // same mailbox, different spelling
        let err = svc.sign_up(buyer_input("max@gmail.com")).await.unwrap_err();
        assert!(matches!(err, IdentityError::Conflict(_)));

        // outside gmail a +tag is part of the address, not an alias
        svc.sign_up(buyer_input("max+promo@example.com")).await.unwrap();
        svc.sign_up(buyer_input("max@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn sign_up_rejects_bad_inputs() {
        let svc = svc();

        let mut input = buyer_input("a@example.com");
        input.user_type = 3;
        assert!(matches!(svc.sign_up(input).await, Err(IdentityError::Validation(_))));

        let mut input = buyer_input("a@example.com");
        input.first_name = "  ".into();
        assert!(matches!(svc.sign_up(input).await, Err(IdentityError::Validation(_))));

        let mut input = buyer_input("not-an-email");
        input.email = "not-an-email".into();
        assert!(matches!(svc.sign_up(input).await, Err(IdentityError::Validation(_))));

        let mut input = buyer_input("a@example.com");
        input.password = "short".into();
        assert!(matches!(svc.sign_up(input).await, Err(IdentityError::Validation(_))));
    }

    #[tokio::test]
    async fn vendor_sign_up_requires_shop_payload() {
        let svc = svc();
        let mut input = buyer_input("vendor@example.com");
        input.user_type = 2;
        let err = svc.sign_up(input).await.unwrap_err();
        assert!(matches!(err, IdentityError::Validation(_)));
        assert_eq!(err.to_string(), "Please enter your shop's details.");
    }

    #[tokio::test]
    async fn vendor_sign_up_creates_shop_and_sign_in_returns_it() {
        let svc = svc();
        let mut input = buyer_input("vendor@example.com");
        input.user_type = 2;
        input.shop = Some(shop_input());
        let session = svc.sign_up(input).await.unwrap();
        let shop = session.shop.expect("vendor sign-up returns the shop");
        assert_eq!(shop.name, "Bean Palace");

        let again = svc
            .sign_in(SignInInput { email: "vendor@example.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        assert_eq!(again.shop.map(|s| s.id), Some(shop.id));
    }

    #[tokio::test]
    async fn failed_shop_creation_leaves_no_user() {
        let svc = svc();
        let mut input = buyer_input("vendor@example.com");
        input.user_type = 2;
        let mut bad_shop = shop_input();
        bad_shop.name = String::new();
        input.shop = Some(bad_shop);
        assert!(svc.sign_up(input).await.is_err());

        // the email must still be free
        let mut retry = buyer_input("vendor@example.com");
        retry.user_type = 2;
        retry.shop = Some(shop_input());
        assert!(svc.sign_up(retry).await.is_ok());
    }

    #[tokio::test]
    async fn token_subject_is_the_new_user_id() {
        let svc = svc();
        let session = svc.sign_up(buyer_input("max@example.com")).await.unwrap();
        assert_eq!(token_subject(&session.token), session.user.id.to_string());

        let signed_in = svc
            .sign_in(SignInInput { email: "max@example.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        assert_eq!(token_subject(&signed_in.token), session.user.id.to_string());
    }

    #[tokio::test]
    async fn sign_in_failures_are_indistinguishable() {
        let svc = svc();
        svc.sign_up(buyer_input("max@example.com")).await.unwrap();

        let unknown = svc
            .sign_in(SignInInput { email: "other@example.com".into(), password: "secret1".into() })
            .await
            .unwrap_err();
        let wrong_password = svc
            .sign_in(SignInInput { email: "max@example.com".into(), password: "nope00".into() })
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), wrong_password.to_string());
        assert_eq!(unknown.to_string(), "Email or password is incorrect.");
    }

    #[tokio::test]
    async fn profile_round_trips_through_encryption() {
        let svc = svc();
        let session = svc.sign_up(buyer_input("max@example.com")).await.unwrap();
        let me = svc.me(session.user.id).await.unwrap();
        assert_eq!(me.first_name, "Max");
        assert_eq!(me.address.city, "Montreal");
    }

    #[tokio::test]
    async fn update_profile_replaces_non_empty_and_retains_the_rest() {
        let svc = svc();
        let session = svc.sign_up(buyer_input("max@example.com")).await.unwrap();

        let updated = svc
            .update_profile(
                session.user.id,
                ProfileUpdate {
                    first_name: Some("Maxine".into()),
                    last_name: Some(String::new()),
                    address: Some(AddressUpdate {
                        street: Some("9 Oak".into()),
                        city: None,
                        province: Some(String::new()),
                    }),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Maxine");
        assert_eq!(updated.last_name, "Martin");
        assert_eq!(updated.address.street, "9 Oak");
        assert_eq!(updated.address.city, "Montreal");
        assert_eq!(updated.address.province, "QC");
    }

    #[tokio::test]
    async fn update_profile_counts_whitespace_as_a_value() {
        // only true emptiness falls back, like the shop update rule
        let svc = svc();
        let session = svc.sign_up(buyer_input("max@example.com")).await.unwrap();
        let updated = svc
            .update_profile(
                session.user.id,
                ProfileUpdate { first_name: Some(" ".into()), ..ProfileUpdate::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, " ");
    }

    #[tokio::test]
    async fn change_password_verifies_old_and_swaps_hash() {
        let svc = svc();
        let session = svc.sign_up(buyer_input("max@example.com")).await.unwrap();
        let id = session.user.id;

        let err = svc.change_password(id, "wrong0", "newpass").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthorized(_)));
        // old password still works after the failed attempt
        assert!(svc
            .sign_in(SignInInput { email: "max@example.com".into(), password: "secret1".into() })
            .await
            .is_ok());

        svc.change_password(id, "secret1", "newpass").await.unwrap();
        assert!(svc
            .sign_in(SignInInput { email: "max@example.com".into(), password: "secret1".into() })
            .await
            .is_err());
        assert!(svc
            .sign_in(SignInInput { email: "max@example.com".into(), password: "newpass".into() })
            .await
            .is_ok());
    }
}
