//! SeaORM repository for charging points

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::domain::charging_point::{ChargingPoint, PointStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::charging_point;

pub struct ChargingPointRepository<'a, C> {
    conn: &'a C,
}

fn model_to_domain(m: charging_point::Model) -> DomainResult<ChargingPoint> {
    Ok(ChargingPoint {
        id: m.id,
        station_id: m.station_id,
        connector_type: m.connector_type,
        power_kw: m.power_kw,
        status: m.status.parse()?,
    })
}

impl<'a, C: ConnectionTrait> ChargingPointRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<Option<ChargingPoint>> {
        charging_point::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<ChargingPoint> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("ChargingPoint", id))
    }

    /// Read the point with an exclusive row lock held until the
    /// surrounding transaction ends.
    ///
    /// The row is rewritten with its own status first. SQLite ignores
    /// `FOR UPDATE`, and a deferred transaction that reads before it writes
    /// fails with SQLITE_BUSY instead of waiting when another connection
    /// is writing. Writing first makes the transaction take the database
    /// write lock here, waiting out the busy timeout.
    pub async fn get_for_update(&self, id: i32) -> DomainResult<ChargingPoint> {
        let touched = charging_point::Entity::update_many()
            .col_expr(
                charging_point::Column::Status,
                Expr::col(charging_point::Column::Status).into(),
            )
            .filter(charging_point::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        if touched.rows_affected == 0 {
            return Err(DomainError::not_found("ChargingPoint", id));
        }

        charging_point::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("ChargingPoint", id))
    }

    pub async fn find_by_station(&self, station_id: i32) -> DomainResult<Vec<ChargingPoint>> {
        charging_point::Entity::find()
            .filter(charging_point::Column::StationId.eq(station_id))
            .order_by_asc(charging_point::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    pub async fn insert(
        &self,
        station_id: i32,
        connector_type: &str,
        power_kw: f64,
    ) -> DomainResult<ChargingPoint> {
        let model = charging_point::ActiveModel {
            id: NotSet,
            station_id: Set(station_id),
            connector_type: Set(connector_type.to_string()),
            power_kw: Set(power_kw),
            status: Set(PointStatus::Available.as_str().to_string()),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    /// Conditional status write; false means another writer moved the
    /// point away from `expected` first.
    pub async fn compare_and_set_status(
        &self,
        id: i32,
        expected: PointStatus,
        new_status: PointStatus,
    ) -> DomainResult<bool> {
        debug!(point_id = id, from = %expected, to = %new_status, "Point status CAS");

        let result = charging_point::Entity::update_many()
            .col_expr(charging_point::Column::Status, Expr::value(new_status.as_str()))
            .filter(charging_point::Column::Id.eq(id))
            .filter(charging_point::Column::Status.eq(expected.as_str()))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    pub async fn set_status(&self, id: i32, status: PointStatus) -> DomainResult<()> {
        let result = charging_point::Entity::update_many()
            .col_expr(charging_point::Column::Status, Expr::value(status.as_str()))
            .filter(charging_point::Column::Id.eq(id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("ChargingPoint", id));
        }
        Ok(())
    }
}
