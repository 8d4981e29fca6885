//! ChargeSession entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "charge_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub driver_id: i32,
    pub vehicle_id: i32,
    pub point_id: i32,
    pub station_id: i32,
    pub start_time: DateTimeUtc,

    #[sea_orm(nullable)]
    pub end_time: Option<DateTimeUtc>,

    /// Energy delivered in kWh
    pub energy_used: f64,
    pub cost: f64,

    /// Session status: ACTIVE, COMPLETED
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charging_point::Entity",
        from = "Column::PointId",
        to = "super::charging_point::Column::Id"
    )]
    ChargingPoint,
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id"
    )]
    Driver,
}

impl Related<super::charging_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargingPoint.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
