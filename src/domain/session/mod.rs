//! Charge session aggregate
//!
//! A realized charging event and the energy pricing applied when it stops.

pub mod model;

pub use model::{ChargeSession, EnergyRate, SessionStatus};
