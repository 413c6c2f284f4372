//! Create `user` table.
//!
//! Name and address columns hold AES-GCM ciphertext, base64 encoded, so they
//! are plain text columns regardless of logical type. Email is stored in its
//! normalized form and is the uniqueness key.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(small_integer(User::UserType).not_null())
                    .col(string_len(User::Email, 255).unique_key().not_null())
                    .col(text(User::FirstName).not_null())
                    .col(text(User::LastName).not_null())
                    .col(text(User::AddressStreet).not_null())
                    .col(text(User::AddressCity).not_null())
                    .col(text(User::AddressProvince).not_null())
                    .col(small_integer(User::Status).not_null())
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    UserType,
    Email,
    FirstName,
    LastName,
    AddressStreet,
    AddressCity,
    AddressProvince,
    Status,
    CreatedAt,
    UpdatedAt,
}
