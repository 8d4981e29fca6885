//! SeaORM repository for bookings

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::domain::booking::{Booking, BookingStatus, TimeWindow};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, charging_point};

pub struct BookingRepository<'a, C> {
    conn: &'a C,
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    Ok(Booking {
        id: m.id,
        driver_id: m.driver_id,
        point_id: m.point_id,
        window: TimeWindow {
            start: m.start_time,
            end: m.end_time,
        },
        status: m.status.parse()?,
        created_at: m.created_at,
    })
}

fn models_to_domain(models: Vec<booking::Model>) -> DomainResult<Vec<Booking>> {
    models.into_iter().map(model_to_domain).collect()
}

impl<'a, C: ConnectionTrait> BookingRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>> {
        booking::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<Booking> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", id))
    }

    /// Bookings still holding their window (PENDING or CONFIRMED).
    pub async fn find_active_for_point(&self, point_id: i32) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::PointId.eq(point_id))
            .filter(booking::Column::Status.is_in([
                BookingStatus::Pending.as_str(),
                BookingStatus::Confirmed.as_str(),
            ]))
            .order_by_asc(booking::Column::StartTime)
            .all(self.conn)
            .await?;
        models_to_domain(models)
    }

    pub async fn find_by_driver(&self, driver_id: i32) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::DriverId.eq(driver_id))
            .order_by_desc(booking::Column::Id)
            .all(self.conn)
            .await?;
        models_to_domain(models)
    }

    pub async fn find_by_station(&self, station_id: i32) -> DomainResult<Vec<Booking>> {
        let point_ids: Vec<i32> = charging_point::Entity::find()
            .select_only()
            .column(charging_point::Column::Id)
            .filter(charging_point::Column::StationId.eq(station_id))
            .into_tuple()
            .all(self.conn)
            .await?;

        if point_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = booking::Entity::find()
            .filter(booking::Column::PointId.is_in(point_ids))
            .order_by_asc(booking::Column::StartTime)
            .all(self.conn)
            .await?;
        models_to_domain(models)
    }

    pub async fn insert(
        &self,
        driver_id: i32,
        point_id: i32,
        window: TimeWindow,
    ) -> DomainResult<Booking> {
        debug!(driver_id, point_id, %window, "Inserting booking");

        let model = booking::ActiveModel {
            id: NotSet,
            driver_id: Set(driver_id),
            point_id: Set(point_id),
            start_time: Set(window.start),
            end_time: Set(window.end),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    /// Move `id` from `from` to `to`. Returns false when the stored status
    /// was no longer `from`.
    pub async fn compare_and_set_status(
        &self,
        id: i32,
        from: BookingStatus,
        to: BookingStatus,
    ) -> DomainResult<bool> {
        let result = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(to.as_str()))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(from.as_str()))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
