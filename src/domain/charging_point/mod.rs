//! Charging point aggregate
//!
//! Stations and their points; a point is the unit of contention.

pub mod model;

pub use model::{ChargingPoint, ChargingStation, PointStatus, StationStatus};
