//! Create invoices table
//!
//! `session_id` is unique: one invoice per charge session.

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_drivers::Drivers;
use super::m20240101_000006_create_charge_sessions::ChargeSessions;
use super::m20240101_000007_create_payment_methods::PaymentMethods;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::SessionId).integer().not_null())
                    .col(ColumnDef::new(Invoices::DriverId).integer().not_null())
                    .col(
                        ColumnDef::new(Invoices::IssueDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::TotalEnergy).double().not_null())
                    .col(ColumnDef::new(Invoices::Amount).double().not_null())
                    .col(ColumnDef::new(Invoices::PaymentMethodId).integer())
                    .col(
                        ColumnDef::new(Invoices::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Invoices::PaidAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_session")
                            .from(Invoices::Table, Invoices::SessionId)
                            .to(ChargeSessions::Table, ChargeSessions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_driver")
                            .from(Invoices::Table, Invoices::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_payment_method")
                            .from(Invoices::Table, Invoices::PaymentMethodId)
                            .to(PaymentMethods::Table, PaymentMethods::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_session_unique")
                    .table(Invoices::Table)
                    .col(Invoices::SessionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_driver")
                    .table(Invoices::Table)
                    .col(Invoices::DriverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Invoices {
    Table,
    Id,
    SessionId,
    DriverId,
    IssueDate,
    TotalEnergy,
    Amount,
    PaymentMethodId,
    Status,
    PaidAt,
}
