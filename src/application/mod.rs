//! Application layer: the services behind every core operation.

pub mod requests;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::BillingConfig;
use crate::domain::{DomainResult, EnergyRate, PaymentGateway};
use crate::shared::KeyedLocks;

pub use requests::{
    CreateBookingRequest, CreatePaymentMethodRequest, StopSessionRequest, TopUpRequest,
};
pub use services::{
    BookingService, ChargingPointService, InvoiceService, PaymentMethodService, SessionService,
    StopOutcome, WalletService,
};

/// All services wired to one database handle. Wallet, session stop and
/// payment methods share one set of per-driver locks.
pub struct ChargingCore {
    pub bookings: BookingService,
    pub points: ChargingPointService,
    pub sessions: SessionService,
    pub wallet: WalletService,
    pub invoices: InvoiceService,
    pub payment_methods: PaymentMethodService,
}

impl ChargingCore {
    pub fn new(
        db: DatabaseConnection,
        billing: &BillingConfig,
        gateway: Arc<dyn PaymentGateway>,
    ) -> DomainResult<Self> {
        let rate = EnergyRate::per_kwh(billing.rate_per_kwh)?;
        let driver_locks = Arc::new(KeyedLocks::new());

        Ok(Self {
            bookings: BookingService::new(db.clone()),
            points: ChargingPointService::new(db.clone()),
            sessions: SessionService::new(
                db.clone(),
                rate,
                billing.auto_issue_invoice,
                driver_locks.clone(),
            ),
            wallet: WalletService::new(db.clone(), gateway, driver_locks.clone()),
            invoices: InvoiceService::new(db.clone()),
            payment_methods: PaymentMethodService::new(db, driver_locks),
        })
    }
}
