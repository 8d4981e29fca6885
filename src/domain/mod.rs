//! Domain layer: entities, value objects and their state machines.

pub mod booking;
pub mod charging_point;
pub mod fleet;
pub mod invoice;
pub mod payment;
pub mod session;
pub mod wallet;

pub use booking::{Booking, BookingEvent, BookingStatus, TimeWindow};
pub use charging_point::{ChargingPoint, ChargingStation, PointStatus, StationStatus};
pub use fleet::{Staff, Vehicle};
pub use invoice::{Invoice, InvoiceStatus};
pub use payment::{AutoApproveGateway, PaymentConfirmation, PaymentGateway, PaymentMethod, PaymentType};
pub use session::{ChargeSession, EnergyRate, SessionStatus};
pub use wallet::{Driver, LedgerAudit, LedgerEntry, LedgerEntryKind, WalletAdjustment};

pub use crate::shared::errors::{DomainError, DomainResult};
