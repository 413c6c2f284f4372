use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;
use crate::shop;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coffee_bean")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub species: String,
    pub origin: String,
    pub roasting_level: String,
    pub price: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Shop }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Shop => Entity::belongs_to(shop::Entity)
                .from(Column::ShopId)
                .to(shop::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new listing.
#[derive(Debug, Clone)]
pub struct NewCoffeeBean {
    pub shop_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub species: String,
    pub origin: String,
    pub roasting_level: String,
    pub price: f64,
}

pub async fn create(db: &DatabaseConnection, new: NewCoffeeBean) -> Result<Model, errors::ModelError> {
    if new.name.trim().is_empty() {
        return Err(errors::ModelError::Validation("listing name required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        shop_id: Set(new.shop_id),
        name: Set(new.name),
        description: Set(new.description),
        species: Set(new.species),
        origin: Set(new.origin),
        roasting_level: Set(new.roasting_level),
        price: Set(new.price),
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

pub async fn find_by_shop(db: &DatabaseConnection, shop_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::ShopId.eq(shop_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
