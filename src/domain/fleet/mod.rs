//! Vehicles and station staff, resolved read-only by the core.

pub mod model;

pub use model::{Staff, Vehicle};
