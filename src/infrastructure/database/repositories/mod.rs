//! Database repository implementations
//!
//! Every repository borrows a `ConnectionTrait`, so the same code runs on
//! the pooled connection or inside an open `DatabaseTransaction`.

pub mod booking_repository;
pub mod charging_point_repository;
pub mod driver_repository;
pub mod invoice_repository;
pub mod payment_method_repository;
pub mod registry_repository;
pub mod session_repository;
pub mod wallet_repository;

pub use booking_repository::BookingRepository;
pub use charging_point_repository::ChargingPointRepository;
pub use driver_repository::DriverRepository;
pub use invoice_repository::InvoiceRepository;
pub use payment_method_repository::PaymentMethodRepository;
pub use registry_repository::{StaffRepository, StationRepository, VehicleRepository};
pub use session_repository::SessionRepository;
pub use wallet_repository::WalletEntryRepository;
