//! Create drivers and vehicles tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Drivers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Drivers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Drivers::Name).string().not_null())
                    .col(
                        ColumnDef::new(Drivers::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Drivers::WalletBalance)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Drivers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vehicles::DriverId).integer().not_null())
                    .col(ColumnDef::new(Vehicles::Plate).string().not_null())
                    .col(ColumnDef::new(Vehicles::Model).string())
                    .col(ColumnDef::new(Vehicles::ConnectorType).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicles_driver")
                            .from(Vehicles::Table, Vehicles::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Drivers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Drivers {
    Table,
    Id,
    Name,
    Email,
    WalletBalance,
    CreatedAt,
}

#[derive(Iden)]
pub enum Vehicles {
    Table,
    Id,
    DriverId,
    Plate,
    Model,
    ConnectorType,
}
