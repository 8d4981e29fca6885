//! Create wallet_entries table
//!
//! Append-only ledger of balance changes. `reference` is unique so the
//! same effect (e.g. one session debit) can never be applied twice.

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
                    .table(WalletEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WalletEntries::DriverId).integer().not_null())
                    .col(ColumnDef::new(WalletEntries::Kind).string().not_null())
                    .col(ColumnDef::new(WalletEntries::Delta).double().not_null())
                    .col(ColumnDef::new(WalletEntries::BalanceBefore).double().not_null())
                    .col(ColumnDef::new(WalletEntries::BalanceAfter).double().not_null())
                    .col(ColumnDef::new(WalletEntries::Reference).string())
                    .col(
                        ColumnDef::new(WalletEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallet_entries_driver")
                            .from(WalletEntries::Table, WalletEntries::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_wallet_entries_reference_unique")
                    .table(WalletEntries::Table)
                    .col(WalletEntries::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_wallet_entries_driver")
                    .table(WalletEntries::Table)
                    .col(WalletEntries::DriverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WalletEntries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum WalletEntries {
    Table,
    Id,
    DriverId,
    Kind,
    Delta,
    BalanceBefore,
    BalanceAfter,
    Reference,
    CreatedAt,
}
