//! Invoice entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub session_id: i32,

    pub driver_id: i32,
    pub issue_date: DateTimeUtc,
    pub total_energy: f64,
    pub amount: f64,

    #[sea_orm(nullable)]
    pub payment_method_id: Option<i32>,

    /// Invoice status: PENDING, PAID
    pub status: String,

    #[sea_orm(nullable)]
    pub paid_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charge_session::Entity",
        from = "Column::SessionId",
        to = "super::charge_session::Column::Id"
    )]
    ChargeSession,
}

impl Related<super::charge_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargeSession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
