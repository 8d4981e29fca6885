//! Booking scheduler
//!
//! Overlap check and insert are serialized per point: first by an
//! in-process mutex, then by an exclusive row lock on the point inside
//! the write transaction.

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, warn};

use crate::application::requests::CreateBookingRequest;
use crate::domain::{Booking, BookingEvent, BookingStatus, DomainError, DomainResult, TimeWindow};
use crate::infrastructure::database::repositories::{
    BookingRepository, ChargingPointRepository, DriverRepository, StaffRepository,
};
use crate::shared::{Caller, KeyedLocks};

use super::ensure_station_operator;

pub struct BookingService {
    db: DatabaseConnection,
    point_locks: KeyedLocks<i32>,
}

impl BookingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            point_locks: KeyedLocks::new(),
        }
    }

    pub async fn create_booking(
        &self,
        caller: &Caller,
        request: CreateBookingRequest,
    ) -> DomainResult<Booking> {
        let driver_id = caller.require_driver()?;
        let window = TimeWindow::new(request.start_time, request.end_time)?;
        DriverRepository::new(&self.db).get(driver_id).await?;

        let point_id = request.point_id;
        let _guard = self.point_locks.lock(point_id).await;
        let txn = self.db.begin().await?;

        ChargingPointRepository::new(&txn).get_for_update(point_id).await?;

        let bookings = BookingRepository::new(&txn);
        let existing = bookings.find_active_for_point(point_id).await?;
        if let Some(clash) = existing.iter().find(|b| b.conflicts_with(&window)) {
            warn!(
                point_id,
                driver_id,
                existing_booking_id = clash.id,
                "Booking rejected: window overlaps"
            );
            metrics::counter!("chargenet_bookings_rejected_total").increment(1);
            return Err(DomainError::Conflict(format!(
                "point {} already booked by booking {} for {}",
                point_id, clash.id, clash.window
            )));
        }

        let booking = bookings.insert(driver_id, point_id, window).await?;
        txn.commit().await?;

        info!(
            booking_id = booking.id,
            driver_id,
            point_id,
            window = %booking.window,
            "Booking created"
        );
        metrics::counter!("chargenet_bookings_created_total").increment(1);
        Ok(booking)
    }

    /// Owner-only. A booking that no longer holds its window is left as is
    /// and reported as InvalidState.
    pub async fn cancel_booking(&self, caller: &Caller, booking_id: i32) -> DomainResult<Booking> {
        let driver_id = caller.require_driver()?;
        let repo = BookingRepository::new(&self.db);
        let mut booking = repo.get(booking_id).await?;

        if booking.driver_id != driver_id {
            return Err(DomainError::PermissionDenied(format!(
                "booking {} belongs to another driver",
                booking_id
            )));
        }

        let from = booking.status;
        booking.transition(BookingEvent::Cancel)?;
        self.store_transition(&booking, from).await?;

        info!(booking_id, driver_id, "Booking cancelled");
        Ok(booking)
    }

    /// Staff-driven progression: PENDING → CONFIRMED → COMPLETED.
    pub async fn update_booking_status(
        &self,
        caller: &Caller,
        booking_id: i32,
        new_status: BookingStatus,
    ) -> DomainResult<Booking> {
        caller.require_operator()?;

        let mut booking = BookingRepository::new(&self.db).get(booking_id).await?;
        let point = ChargingPointRepository::new(&self.db)
            .get(booking.point_id)
            .await?;
        ensure_station_operator(&self.db, caller, point.station_id).await?;

        let event = match new_status {
            BookingStatus::Confirmed => BookingEvent::Confirm,
            BookingStatus::Completed => BookingEvent::Complete,
            BookingStatus::Cancelled | BookingStatus::Pending => {
                return Err(DomainError::PermissionDenied(format!(
                    "staff may not set a booking to {}",
                    new_status
                )))
            }
        };

        let from = booking.status;
        booking.transition(event)?;
        self.store_transition(&booking, from).await?;

        info!(
            booking_id,
            from = %from,
            to = %booking.status,
            operator_id = caller.user_id,
            "Booking status updated"
        );
        Ok(booking)
    }

    pub async fn get_booking(&self, caller: &Caller, booking_id: i32) -> DomainResult<Booking> {
        let booking = BookingRepository::new(&self.db).get(booking_id).await?;
        caller.require_driver_or_operator(booking.driver_id)?;
        Ok(booking)
    }

    /// Newest first.
    pub async fn list_my_bookings(&self, caller: &Caller) -> DomainResult<Vec<Booking>> {
        let driver_id = caller.require_driver()?;
        BookingRepository::new(&self.db).find_by_driver(driver_id).await
    }

    /// Bookings on every point of the calling staff member's station.
    pub async fn list_station_bookings(&self, caller: &Caller) -> DomainResult<Vec<Booking>> {
        caller.require_operator()?;
        let staff = StaffRepository::new(&self.db).get(caller.user_id).await?;
        BookingRepository::new(&self.db)
            .find_by_station(staff.station_id)
            .await
    }

    async fn store_transition(&self, booking: &Booking, from: BookingStatus) -> DomainResult<()> {
        let written = BookingRepository::new(&self.db)
            .compare_and_set_status(booking.id, from, booking.status)
            .await?;
        if !written {
            return Err(DomainError::Conflict(format!(
                "booking {} changed concurrently, no longer {}",
                booking.id, from
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::application::test_support::{pooled_test_db, seed, test_db};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 5, 1, hour, minute, 0).unwrap()
    }

    fn request(point_id: i32, from: (u32, u32), to: (u32, u32)) -> CreateBookingRequest {
        CreateBookingRequest {
            point_id,
            start_time: at(from.0, from.1),
            end_time: at(to.0, to.1),
        }
    }

    #[tokio::test]
    async fn overlapping_window_is_rejected_and_touching_window_accepted() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);

        let a = Caller::driver(fx.driver_a);
        let b = Caller::driver(fx.driver_b);

        service
            .create_booking(&a, request(fx.point, (10, 0), (11, 0)))
            .await
            .unwrap();

        let err = service
            .create_booking(&b, request(fx.point, (10, 30), (11, 30)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(err.is_retryable());

        let touching = service
            .create_booking(&b, request(fx.point, (11, 0), (12, 0)))
            .await
            .unwrap();
        assert_eq!(touching.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn conflict_message_names_existing_booking() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);

        let first = service
            .create_booking(&Caller::driver(fx.driver_a), request(fx.point, (9, 0), (10, 0)))
            .await
            .unwrap();
        let err = service
            .create_booking(&Caller::driver(fx.driver_b), request(fx.point, (9, 0), (10, 0)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains(&format!("booking {}", first.id)));
    }

    #[tokio::test]
    async fn cancelled_booking_frees_its_window() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);
        let a = Caller::driver(fx.driver_a);

        let booking = service
            .create_booking(&a, request(fx.point, (10, 0), (11, 0)))
            .await
            .unwrap();
        service.cancel_booking(&a, booking.id).await.unwrap();

        service
            .create_booking(&Caller::driver(fx.driver_b), request(fx.point, (10, 0), (11, 0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn other_points_are_independent() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);

        service
            .create_booking(&Caller::driver(fx.driver_a), request(fx.point, (10, 0), (11, 0)))
            .await
            .unwrap();
        service
            .create_booking(
                &Caller::driver(fx.driver_b),
                request(fx.other_point, (10, 0), (11, 0)),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_window_and_unknown_point_are_rejected() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);
        let a = Caller::driver(fx.driver_a);

        let err = service
            .create_booking(&a, request(fx.point, (10, 0), (10, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service
            .create_booking(&a, request(9999, (10, 0), (11, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn only_drivers_book() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);

        let err = service
            .create_booking(&Caller::staff(fx.staff_x), request(fx.point, (10, 0), (11, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_overlapping_requests_admit_exactly_one() {
        let pooled = pooled_test_db().await;
        let fx = seed(&pooled.db).await;
        let service = Arc::new(BookingService::new(pooled.db.clone()));

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = Arc::clone(&service);
            let driver = if i % 2 == 0 { fx.driver_a } else { fx.driver_b };
            let point = fx.point;
            handles.push(tokio::spawn(async move {
                service
                    .create_booking(&Caller::driver(driver), request(point, (14, 0), (15, 0)))
                    .await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DomainError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn cancellation_is_owner_only_and_not_repeatable() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);
        let a = Caller::driver(fx.driver_a);

        let booking = service
            .create_booking(&a, request(fx.point, (10, 0), (11, 0)))
            .await
            .unwrap();

        let err = service
            .cancel_booking(&Caller::driver(fx.driver_b), booking.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        let cancelled = service.cancel_booking(&a, booking.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let err = service.cancel_booking(&a, booking.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        let stored = service.get_booking(&a, booking.id).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn staff_of_another_station_cannot_update_status() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);

        // point_y belongs to station Y, staff_x is assigned to station X
        let booking = service
            .create_booking(&Caller::driver(fx.driver_a), request(fx.point_y, (10, 0), (11, 0)))
            .await
            .unwrap();

        let err = service
            .update_booking_status(&Caller::staff(fx.staff_x), booking.id, BookingStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn staff_progresses_booking_forward_only() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);
        let staff = Caller::staff(fx.staff_x);

        let booking = service
            .create_booking(&Caller::driver(fx.driver_a), request(fx.point, (10, 0), (11, 0)))
            .await
            .unwrap();

        let err = service
            .update_booking_status(&staff, booking.id, BookingStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        let err = service
            .update_booking_status(&staff, booking.id, BookingStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        let confirmed = service
            .update_booking_status(&staff, booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        let completed = service
            .update_booking_status(&Caller::admin(1), booking.id, BookingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn station_listing_covers_all_points_of_the_station() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = BookingService::new(db);
        let a = Caller::driver(fx.driver_a);

        service
            .create_booking(&a, request(fx.point, (10, 0), (11, 0)))
            .await
            .unwrap();
        service
            .create_booking(&a, request(fx.other_point, (12, 0), (13, 0)))
            .await
            .unwrap();
        service
            .create_booking(&a, request(fx.point_y, (12, 0), (13, 0)))
            .await
            .unwrap();

        let listed = service
            .list_station_bookings(&Caller::staff(fx.staff_x))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);

        let mine = service.list_my_bookings(&a).await.unwrap();
        assert_eq!(mine.len(), 3);
    }
}
