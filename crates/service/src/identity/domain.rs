use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign-up input as received from the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    #[serde(rename = "userType")]
    pub user_type: i16,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub address: AddressInput,
    #[serde(default)]
    pub shop: Option<ShopInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub province: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Shop payload carried by a vendor sign-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub image: String,
    pub location: GeoPoint,
    #[serde(rename = "deliveryRange", default)]
    pub delivery_range: f64,
}

/// Sign-in input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Profile update; empty or omitted fields retain the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address: Option<AddressUpdate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressUpdate {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
}

/// User row as persisted: PII columns carry ciphertext.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUser {
    pub id: Uuid,
    pub user_type: i16,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address_street: String,
    pub address_city: String,
    pub address_province: String,
    pub status: i16,
}

/// Final ciphertext values for a profile update; the service performs the
/// replace-or-retain merge before these reach the repository.
#[derive(Debug, Clone)]
pub struct ProfileColumns {
    pub first_name: String,
    pub last_name: String,
    pub address_street: String,
    pub address_city: String,
    pub address_province: String,
}

/// Presentation view of a user: PII decrypted, password absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub id: Uuid,
    #[serde(rename = "userType")]
    pub user_type: i16,
    pub email: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub address: Address,
    pub status: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub province: String,
}

/// Shop as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopProfile {
    #[serde(rename = "shopId")]
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub image: String,
    pub location: GeoPoint,
    #[serde(rename = "deliveryRange")]
    pub delivery_range: f64,
    pub status: i16,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Result of sign-up and sign-in: the profile, the vendor's shop when one
/// exists, and a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: UserProfile,
    pub shop: Option<ShopProfile>,
    pub token: String,
}
