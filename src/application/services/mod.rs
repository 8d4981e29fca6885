//! Application services
//!
//! Each service owns a `DatabaseConnection` handle and opens its own
//! transactions. In-process locks are always taken before `begin()`.

pub mod booking;
pub mod charging_point;
pub mod invoice;
pub mod payment_method;
pub mod session;
pub mod wallet;

pub use booking::BookingService;
pub use charging_point::ChargingPointService;
pub use invoice::InvoiceService;
pub use payment_method::PaymentMethodService;
pub use session::{SessionService, StopOutcome};
pub use wallet::WalletService;

use sea_orm::ConnectionTrait;

use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::repositories::StaffRepository;
use crate::shared::{Caller, Role};

/// Admins act on any station; staff only on the one they are assigned to.
pub(crate) async fn ensure_station_operator<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    station_id: i32,
) -> DomainResult<()> {
    match caller.role {
        Role::Admin => Ok(()),
        Role::Staff => StaffRepository::new(conn)
            .get(caller.user_id)
            .await?
            .ensure_assigned_to(station_id),
        Role::Driver => Err(DomainError::PermissionDenied(format!(
            "driver {} cannot operate station {}",
            caller.user_id, station_id
        ))),
    }
}
