//! Request payloads for core operations that carry free-form input.
//!
//! Identifiers are checked against storage by the services; these structs
//! only guard value ranges.

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::domain::{DomainError, DomainResult, PaymentType};

#[derive(Debug, Clone)]
pub struct CreateBookingRequest {
    pub point_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Validate)]
pub struct StopSessionRequest {
    pub session_id: i32,
    #[validate(range(min = 0.0, message = "energy_used must be non-negative"))]
    pub energy_used: f64,
}

#[derive(Debug, Clone, Validate)]
pub struct TopUpRequest {
    #[validate(range(exclusive_min = 0.0, message = "top-up amount must be positive"))]
    pub amount: f64,
    pub payment_method_id: i32,
}

#[derive(Debug, Clone, Validate)]
pub struct CreatePaymentMethodRequest {
    pub payment_type: PaymentType,
    #[validate(length(min = 1, max = 100, message = "provider must be 1–100 characters"))]
    pub provider: String,
    pub is_default: bool,
}

/// `validate()` plus a finiteness check; range rules let NaN through.
pub(crate) fn check_amount(name: &str, value: f64) -> DomainResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "{} must be a finite number, got {}",
            name, value
        )))
    }
}
