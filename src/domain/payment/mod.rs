//! Payment methods and the external payment gateway port.

pub mod gateway;
pub mod model;

pub use gateway::{AutoApproveGateway, PaymentConfirmation, PaymentGateway};
pub use model::{PaymentMethod, PaymentType};
