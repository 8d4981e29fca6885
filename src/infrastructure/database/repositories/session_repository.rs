//! SeaORM repository for charge sessions

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::session::{ChargeSession, SessionStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::charge_session;

pub struct SessionRepository<'a, C> {
    conn: &'a C,
}

fn model_to_domain(m: charge_session::Model) -> DomainResult<ChargeSession> {
    Ok(ChargeSession {
        id: m.id,
        driver_id: m.driver_id,
        vehicle_id: m.vehicle_id,
        point_id: m.point_id,
        station_id: m.station_id,
        start_time: m.start_time,
        end_time: m.end_time,
        energy_used: m.energy_used,
        cost: m.cost,
        status: m.status.parse()?,
    })
}

impl<'a, C: ConnectionTrait> SessionRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<Option<ChargeSession>> {
        charge_session::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<ChargeSession> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("ChargeSession", id))
    }

    pub async fn find_by_driver(&self, driver_id: i32) -> DomainResult<Vec<ChargeSession>> {
        charge_session::Entity::find()
            .filter(charge_session::Column::DriverId.eq(driver_id))
            .order_by_desc(charge_session::Column::StartTime)
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    pub async fn insert_active(
        &self,
        driver_id: i32,
        vehicle_id: i32,
        point_id: i32,
        station_id: i32,
        start_time: DateTime<Utc>,
    ) -> DomainResult<ChargeSession> {
        debug!(driver_id, vehicle_id, point_id, "Inserting charge session");

        let model = charge_session::ActiveModel {
            id: NotSet,
            driver_id: Set(driver_id),
            vehicle_id: Set(vehicle_id),
            point_id: Set(point_id),
            station_id: Set(station_id),
            start_time: Set(start_time),
            end_time: Set(None),
            energy_used: Set(0.0),
            cost: Set(0.0),
            status: Set(SessionStatus::Active.as_str().to_string()),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    /// Persist a completed session, only if the stored row is still ACTIVE.
    /// Returns false when another stop got there first.
    pub async fn complete_if_active(&self, session: &ChargeSession) -> DomainResult<bool> {
        let result = charge_session::Entity::update_many()
            .col_expr(charge_session::Column::EndTime, Expr::value(session.end_time))
            .col_expr(charge_session::Column::EnergyUsed, Expr::value(session.energy_used))
            .col_expr(charge_session::Column::Cost, Expr::value(session.cost))
            .col_expr(
                charge_session::Column::Status,
                Expr::value(SessionStatus::Completed.as_str()),
            )
            .filter(charge_session::Column::Id.eq(session.id))
            .filter(charge_session::Column::Status.eq(SessionStatus::Active.as_str()))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = charge_session::Entity::delete_by_id(id)
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("ChargeSession", id));
        }
        Ok(())
    }
}
