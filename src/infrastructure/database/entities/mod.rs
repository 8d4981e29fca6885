//! Database entities module

pub mod booking;
pub mod charge_session;
pub mod charging_point;
pub mod charging_station;
pub mod driver;
pub mod invoice;
pub mod payment_method;
pub mod staff;
pub mod vehicle;
pub mod wallet_entry;

pub use booking::Entity as Booking;
pub use charge_session::Entity as ChargeSession;
pub use charging_point::Entity as ChargingPoint;
pub use charging_station::Entity as ChargingStation;
pub use driver::Entity as Driver;
pub use invoice::Entity as Invoice;
pub use payment_method::Entity as PaymentMethod;
pub use staff::Entity as Staff;
pub use vehicle::Entity as Vehicle;
pub use wallet_entry::Entity as WalletEntry;
