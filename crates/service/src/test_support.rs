#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use uuid::Uuid;

use common::crypto::{generate_base64_key, FieldCipher};
use models::{shop, user};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_init(|| async {
            let db = models::db::connect().await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
            drop(db);
        })
        .await;

    // Return a fresh connection for the current test's runtime
    models::db::connect().await
}

pub fn test_cipher() -> FieldCipher {
    FieldCipher::from_base64_key(&generate_base64_key()).expect("fresh key is valid")
}

/// A vendor account with its shop; PII columns hold throwaway ciphertext.
pub async fn vendor_with_shop(db: &DatabaseConnection) -> Result<(user::Model, shop::Model), anyhow::Error> {
    let vendor = user::create(
        db,
        user::NewUser {
            id: Uuid::new_v4(),
            user_type: user::USER_TYPE_VENDOR,
            email: format!("vendor_{}@example.com", Uuid::new_v4()),
            first_name: "enc:first".into(),
            last_name: "enc:last".into(),
            address_street: "enc:street".into(),
            address_city: "enc:city".into(),
            address_province: "enc:province".into(),
        },
    )
    .await?;
    let s = shop::create(
        db,
        shop::NewShop {
            user_id: vendor.id,
            name: "Old".into(),
            description: "Old desc".into(),
            address: "123 St".into(),
            image: String::new(),
            lat: 45.5,
            lng: -73.6,
            delivery_range: 10.0,
        },
    )
    .await?;
    Ok((vendor, s))
}

/// A buyer whose name columns are encrypted with the given cipher, so review
/// enrichment can decrypt them.
pub async fn buyer(db: &DatabaseConnection, cipher: &FieldCipher) -> Result<user::Model, anyhow::Error> {
    let created = user::create(
        db,
        user::NewUser {
            id: Uuid::new_v4(),
            user_type: user::USER_TYPE_BUYER,
            email: format!("buyer_{}@example.com", Uuid::new_v4()),
            first_name: cipher.encrypt("Max")?,
            last_name: cipher.encrypt("Martin")?,
            address_street: cipher.encrypt("1 Main")?,
            address_city: cipher.encrypt("Montreal")?,
            address_province: cipher.encrypt("QC")?,
        },
    )
    .await?;
    Ok(created)
}
