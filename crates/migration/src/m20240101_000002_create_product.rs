//! Create `product` table.
//!
//! `price > 0` and `stock >= 0` are checked before insert, so the table
//! carries no CHECK constraints for them.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(pk_auto(Product::Id))
                    .col(string_len(Product::Name, 100))
                    .col(string(Product::Category))
                    .col(double(Product::Price))
                    .col(integer(Product::Stock))
                    .col(text_null(Product::Description))
                    .col(timestamp_with_time_zone(Product::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product { Table, Id, Name, Category, Price, Stock, Description, CreatedAt }
