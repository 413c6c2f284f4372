//! Create `coffee_bean` table with FK to `shop`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CoffeeBean::Table)
                    .if_not_exists()
                    .col(uuid(CoffeeBean::Id).primary_key())
                    .col(uuid(CoffeeBean::ShopId).not_null())
                    .col(string_len(CoffeeBean::Name, 255).not_null())
                    // Optional listing copy
                    .col(ColumnDef::new(CoffeeBean::Description).text().null())
                    .col(string_len(CoffeeBean::Species, 128).not_null())
                    .col(string_len(CoffeeBean::Origin, 128).not_null())
                    .col(string_len(CoffeeBean::RoastingLevel, 64).not_null())
                    .col(double(CoffeeBean::Price).not_null())
                    .col(timestamp_with_time_zone(CoffeeBean::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(CoffeeBean::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_coffee_bean_shop")
                            .from(CoffeeBean::Table, CoffeeBean::ShopId)
                            .to(Shop::Table, Shop::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CoffeeBean::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CoffeeBean {
    Table,
    Id,
    ShopId,
    Name,
    Description,
    Species,
    Origin,
    RoastingLevel,
    Price,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Shop {
    Table,
    Id,
}
