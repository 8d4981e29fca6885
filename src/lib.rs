//! # ChargeNet billing core
//!
//! Reservation-to-billing core for an EV charging network: bookings on
//! charging points, charge sessions, driver wallets, invoices and
//! payment methods.
//!
//! ## Architecture
//!
//! - **domain**: entities, value objects and their state machines
//! - **application**: services implementing each operation
//! - **infrastructure**: SeaORM entities, migrations and repositories
//! - **shared**: caller identity, errors, keyed locks

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ChargingCore;
pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use shared::{Caller, DomainError, DomainResult, Role};
