//! ChargingPoint entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "charging_points")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub station_id: i32,
    pub connector_type: String,
    pub power_kw: f64,

    /// Status: AVAILABLE, CHARGING, RESERVED, OFFLINE, UNAVAILABLE
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charging_station::Entity",
        from = "Column::StationId",
        to = "super::charging_station::Column::Id"
    )]
    Station,
}

impl Related<super::charging_station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Station.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
