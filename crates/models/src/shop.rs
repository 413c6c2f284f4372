use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;
use crate::user;

pub const STATUS_ACTIVE: i16 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shop")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub image: String,
    pub lat: f64,
    pub lng: f64,
    pub delivery_range: f64,
    pub status: i16,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new shop, owner included.
#[derive(Debug, Clone)]
pub struct NewShop {
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub image: String,
    pub lat: f64,
    pub lng: f64,
    pub delivery_range: f64,
}

pub async fn create(db: &DatabaseConnection, new: NewShop) -> Result<Model, errors::ModelError> {
    if new.name.trim().is_empty() {
        return Err(errors::ModelError::Validation("shop name required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(new.user_id),
        name: Set(new.name),
        description: Set(new.description),
        address: Set(new.address),
        image: Set(new.image),
        lat: Set(new.lat),
        lng: Set(new.lng),
        delivery_range: Set(new.delivery_range),
        status: Set(STATUS_ACTIVE),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_owner(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
