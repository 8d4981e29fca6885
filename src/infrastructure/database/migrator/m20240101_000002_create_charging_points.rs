//! Create charging_points table
//!
//! A point is the unit of contention; its status row doubles as the
//! occupancy lock for sessions.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_charging_stations::ChargingStations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChargingPoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargingPoints::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChargingPoints::StationId).integer().not_null())
                    .col(
                        ColumnDef::new(ChargingPoints::ConnectorType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChargingPoints::PowerKw)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ChargingPoints::Status)
                            .string()
                            .not_null()
                            .default("AVAILABLE"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charging_points_station")
                            .from(ChargingPoints::Table, ChargingPoints::StationId)
                            .to(ChargingStations::Table, ChargingStations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_charging_points_station")
                    .table(ChargingPoints::Table)
                    .col(ChargingPoints::StationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChargingPoints::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ChargingPoints {
    Table,
    Id,
    StationId,
    ConnectorType,
    PowerKw,
    Status,
}
