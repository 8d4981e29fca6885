//! External payment gateway port

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::model::PaymentMethod;
use crate::shared::errors::DomainResult;

/// Outcome reported by the gateway for one charge attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub approved: bool,
    /// Gateway-side transaction reference
    pub reference: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` to `method`. `Err` means the gateway could not be
    /// reached; a refusal is `Ok` with `approved == false`.
    async fn charge(&self, method: &PaymentMethod, amount: f64) -> DomainResult<PaymentConfirmation>;
}

/// Gateway stand-in that approves every charge.
#[derive(Debug, Default, Clone)]
pub struct AutoApproveGateway;

#[async_trait]
impl PaymentGateway for AutoApproveGateway {
    async fn charge(&self, method: &PaymentMethod, amount: f64) -> DomainResult<PaymentConfirmation> {
        let reference = Uuid::new_v4().to_string();
        debug!(
            payment_method_id = method.id,
            provider = method.provider.as_str(),
            amount,
            reference = reference.as_str(),
            "Payment auto-approved"
        );
        Ok(PaymentConfirmation {
            approved: true,
            reference,
        })
    }
}
