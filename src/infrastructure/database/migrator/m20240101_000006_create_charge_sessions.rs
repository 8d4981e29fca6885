//! Create charge_sessions table

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_charging_points::ChargingPoints;
use super::m20240101_000003_create_drivers::{Drivers, Vehicles};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChargeSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargeSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChargeSessions::DriverId).integer().not_null())
                    .col(ColumnDef::new(ChargeSessions::VehicleId).integer().not_null())
                    .col(ColumnDef::new(ChargeSessions::PointId).integer().not_null())
                    .col(ColumnDef::new(ChargeSessions::StationId).integer().not_null())
                    .col(
                        ColumnDef::new(ChargeSessions::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChargeSessions::EndTime).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ChargeSessions::EnergyUsed)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ChargeSessions::Cost)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ChargeSessions::Status)
                            .string()
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charge_sessions_driver")
                            .from(ChargeSessions::Table, ChargeSessions::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charge_sessions_vehicle")
                            .from(ChargeSessions::Table, ChargeSessions::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charge_sessions_point")
                            .from(ChargeSessions::Table, ChargeSessions::PointId)
                            .to(ChargingPoints::Table, ChargingPoints::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Active session lookup per point
        manager
            .create_index(
                Index::create()
                    .name("idx_charge_sessions_point_status")
                    .table(ChargeSessions::Table)
                    .col(ChargeSessions::PointId)
                    .col(ChargeSessions::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChargeSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ChargeSessions {
    Table,
    Id,
    DriverId,
    VehicleId,
    PointId,
    StationId,
    StartTime,
    EndTime,
    EnergyUsed,
    Cost,
    Status,
}
