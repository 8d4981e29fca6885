//! Create payment_methods table

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_drivers::Drivers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentMethods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentMethods::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentMethods::DriverId).integer().not_null())
                    .col(
                        ColumnDef::new(PaymentMethods::PaymentType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentMethods::Provider).string().not_null())
                    .col(
                        ColumnDef::new(PaymentMethods::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PaymentMethods::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_methods_driver")
                            .from(PaymentMethods::Table, PaymentMethods::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_methods_driver")
                    .table(PaymentMethods::Table)
                    .col(PaymentMethods::DriverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum PaymentMethods {
    Table,
    Id,
    DriverId,
    PaymentType,
    Provider,
    IsDefault,
    CreatedAt,
}
