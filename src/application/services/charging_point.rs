//! Operator access to point status

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::domain::{ChargingPoint, ChargingStation, DomainError, DomainResult, PointStatus};
use crate::infrastructure::database::repositories::{ChargingPointRepository, StationRepository};
use crate::shared::Caller;

use super::ensure_station_operator;

pub struct ChargingPointService {
    db: DatabaseConnection,
}

impl ChargingPointService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_point(&self, point_id: i32) -> DomainResult<ChargingPoint> {
        ChargingPointRepository::new(&self.db).get(point_id).await
    }

    pub async fn get_station(&self, station_id: i32) -> DomainResult<ChargingStation> {
        StationRepository::new(&self.db).get(station_id).await
    }

    pub async fn list_station_points(&self, station_id: i32) -> DomainResult<Vec<ChargingPoint>> {
        let station = StationRepository::new(&self.db).get(station_id).await?;
        ChargingPointRepository::new(&self.db)
            .find_by_station(station.id)
            .await
    }

    /// Put a point in or out of service. CHARGING is reserved for
    /// session start and cannot be entered or left from here.
    pub async fn set_point_status(
        &self,
        caller: &Caller,
        point_id: i32,
        status: PointStatus,
    ) -> DomainResult<ChargingPoint> {
        caller.require_operator()?;

        let txn = self.db.begin().await?;
        let points = ChargingPointRepository::new(&txn);
        let mut point = points.get_for_update(point_id).await?;
        ensure_station_operator(&txn, caller, point.station_id).await?;

        let from = point.status;
        let target = from.operator_set(status)?;
        if !points.compare_and_set_status(point_id, from, target).await? {
            return Err(DomainError::Conflict(format!(
                "point {} changed concurrently, no longer {}",
                point_id, from
            )));
        }
        txn.commit().await?;

        point.status = target;
        info!(
            point_id,
            from = %from,
            to = %target,
            operator_id = caller.user_id,
            "Point status set by operator"
        );
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{seed, test_db};

    #[tokio::test]
    async fn staff_takes_own_point_offline_and_back() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = ChargingPointService::new(db);
        let staff = Caller::staff(fx.staff_x);

        let point = service
            .set_point_status(&staff, fx.point, PointStatus::Offline)
            .await
            .unwrap();
        assert_eq!(point.status, PointStatus::Offline);

        service
            .set_point_status(&staff, fx.point, PointStatus::Available)
            .await
            .unwrap();
        assert!(service.get_point(fx.point).await.unwrap().is_available());
    }

    #[tokio::test]
    async fn charging_is_not_an_operator_target() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = ChargingPointService::new(db);

        let err = service
            .set_point_status(&Caller::admin(1), fx.point, PointStatus::Charging)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn foreign_station_and_drivers_are_denied() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = ChargingPointService::new(db);

        let err = service
            .set_point_status(&Caller::staff(fx.staff_x), fx.point_y, PointStatus::Offline)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        let err = service
            .set_point_status(&Caller::driver(fx.driver_a), fx.point, PointStatus::Offline)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
        assert_eq!(
            service.get_point(fx.point_y).await.unwrap().status,
            PointStatus::Available
        );

        let point = service
            .set_point_status(&Caller::staff(fx.staff_y), fx.point_y, PointStatus::Unavailable)
            .await
            .unwrap();
        assert_eq!(point.status, PointStatus::Unavailable);
    }

    #[tokio::test]
    async fn station_points_are_listed() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = ChargingPointService::new(db);

        let points = service.list_station_points(fx.station_x).await.unwrap();
        assert_eq!(points.len(), 2);
        assert!(service.list_station_points(9999).await.is_err());
    }
}
