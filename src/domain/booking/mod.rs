//! Booking aggregate
//!
//! A driver's claim on a charging point for a half-open time window.

pub mod model;

pub use model::{Booking, BookingEvent, BookingStatus, TimeWindow};
