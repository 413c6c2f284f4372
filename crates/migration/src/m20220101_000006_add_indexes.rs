use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Shop: one shop per owner
        manager
            .create_index(
                Index::create()
                    .name("uniq_shop_owner")
                    .table(Shop::Table)
                    .col(Shop::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // CoffeeBean: index on shop_id
        manager
            .create_index(
                Index::create()
                    .name("idx_coffee_bean_shop")
                    .table(CoffeeBean::Table)
                    .col(CoffeeBean::ShopId)
                    .to_owned(),
            )
            .await?;

        // Review: index on coffee_bean_id for listing
        manager
            .create_index(
                Index::create()
                    .name("idx_review_coffee_bean")
                    .table(Review::Table)
                    .col(Review::CoffeeBeanId)
                    .to_owned(),
            )
            .await?;

        // Review: composite unique (coffee_bean_id, user_id) closes the
        // check-then-create race at the store level
        manager
            .create_index(
                Index::create()
                    .name("uniq_review_bean_user")
                    .table(Review::Table)
                    .col(Review::CoffeeBeanId)
                    .col(Review::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_shop_owner").table(Shop::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_coffee_bean_shop")
                    .table(CoffeeBean::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_review_coffee_bean")
                    .table(Review::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("uniq_review_bean_user")
                    .table(Review::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Shop {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum CoffeeBean {
    Table,
    ShopId,
}

#[derive(DeriveIden)]
enum Review {
    Table,
    CoffeeBeanId,
    UserId,
}
