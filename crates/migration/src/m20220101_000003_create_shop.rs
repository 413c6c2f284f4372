//! Create `shop` table with FK to `user`.
//!
//! One shop per vendor; the uniqueness of `user_id` is enforced by the index
//! migration.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shop::Table)
                    .if_not_exists()
                    .col(uuid(Shop::Id).primary_key())
                    .col(uuid(Shop::UserId).not_null())
                    .col(string_len(Shop::Name, 255).not_null())
                    .col(text(Shop::Description).not_null())
                    .col(text(Shop::Address).not_null())
                    .col(text(Shop::Image).not_null())
                    .col(double(Shop::Lat).not_null())
                    .col(double(Shop::Lng).not_null())
                    .col(double(Shop::DeliveryRange).not_null())
                    .col(small_integer(Shop::Status).not_null())
                    .col(timestamp_with_time_zone(Shop::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Shop::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shop_user")
                            .from(Shop::Table, Shop::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Shop::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Shop {
    Table,
    Id,
    UserId,
    Name,
    Description,
    Address,
    Image,
    Lat,
    Lng,
    DeliveryRange,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
