//! Invoice aggregate

pub mod model;

pub use model::{Invoice, InvoiceStatus};
