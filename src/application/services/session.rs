//! Charge session lifecycle
//!
//! Start claims the point with a conditional update. Stop completes the
//! session, releases the point and debits the wallet in one transaction,
//! holding the driver's lock shared with the wallet service.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, warn};
use validator::Validate;

use crate::application::requests::{check_amount, StopSessionRequest};
use crate::domain::{
    ChargeSession, DomainError, DomainResult, EnergyRate, Invoice, LedgerEntry, LedgerEntryKind,
    PointStatus, WalletAdjustment,
};
use crate::infrastructure::database::repositories::{
    ChargingPointRepository, DriverRepository, InvoiceRepository, SessionRepository,
    VehicleRepository,
};
use crate::shared::{Caller, KeyedLocks};

use super::invoice::issue_invoice;
use super::wallet::apply_adjustment;

/// Everything a successful stop changed.
#[derive(Debug, Clone)]
pub struct StopOutcome {
    pub session: ChargeSession,
    pub debit: WalletAdjustment,
    /// Balance went below zero with this debit
    pub overdrawn: bool,
    /// Present when invoices are issued automatically at stop
    pub invoice: Option<Invoice>,
}

pub struct SessionService {
    db: DatabaseConnection,
    rate: EnergyRate,
    auto_issue_invoice: bool,
    driver_locks: Arc<KeyedLocks<i32>>,
}

impl SessionService {
    pub fn new(
        db: DatabaseConnection,
        rate: EnergyRate,
        auto_issue_invoice: bool,
        driver_locks: Arc<KeyedLocks<i32>>,
    ) -> Self {
        Self {
            db,
            rate,
            auto_issue_invoice,
            driver_locks,
        }
    }

    pub async fn start_session(
        &self,
        caller: &Caller,
        driver_id: i32,
        vehicle_id: i32,
        point_id: i32,
    ) -> DomainResult<ChargeSession> {
        DriverRepository::new(&self.db).get(driver_id).await?;
        let vehicle = VehicleRepository::new(&self.db).get(vehicle_id).await?;
        let point = ChargingPointRepository::new(&self.db).get(point_id).await?;

        caller.require_driver_or_operator(driver_id)?;
        vehicle.ensure_owned_by(driver_id)?;
        let target = point.status.begin_charging()?;

        let txn = self.db.begin().await?;
        let claimed = ChargingPointRepository::new(&txn)
            .compare_and_set_status(point_id, PointStatus::Available, target)
            .await?;
        if !claimed {
            warn!(point_id, driver_id, "Lost race for charging point");
            return Err(DomainError::Conflict(format!(
                "point {} was claimed by another session",
                point_id
            )));
        }

        let session = SessionRepository::new(&txn)
            .insert_active(driver_id, vehicle_id, point_id, point.station_id, Utc::now())
            .await?;
        txn.commit().await?;

        info!(
            session_id = session.id,
            driver_id,
            vehicle_id,
            point_id,
            "Charge session started"
        );
        metrics::counter!("chargenet_sessions_started_total").increment(1);
        Ok(session)
    }

    /// Complete the session, free the point and debit `energy × rate`.
    /// Either all three happen or none does.
    pub async fn stop_session(
        &self,
        caller: &Caller,
        request: StopSessionRequest,
    ) -> DomainResult<StopOutcome> {
        let mut session = SessionRepository::new(&self.db)
            .get(request.session_id)
            .await?;
        caller.require_driver_or_operator(session.driver_id)?;
        if !session.is_active() {
            return Err(DomainError::InvalidState(format!(
                "session {} is {}, not ACTIVE",
                session.id, session.status
            )));
        }
        request.validate()?;
        check_amount("energy_used", request.energy_used)?;

        session.complete(request.energy_used, self.rate, Utc::now())?;

        let _guard = self.driver_locks.lock(session.driver_id).await;
        let txn = self.db.begin().await?;
        if !SessionRepository::new(&txn).complete_if_active(&session).await? {
            return Err(DomainError::InvalidState(format!(
                "session {} is no longer ACTIVE",
                session.id
            )));
        }

        ChargingPointRepository::new(&txn)
            .set_status(session.point_id, PointStatus::Charging.release())
            .await?;

        let debit = apply_adjustment(
            &txn,
            session.driver_id,
            -session.cost,
            LedgerEntryKind::SessionDebit,
            Some(LedgerEntry::session_reference(session.id)),
        )
        .await?;

        let invoice = if self.auto_issue_invoice {
            Some(issue_invoice(&txn, &session).await?)
        } else {
            None
        };
        txn.commit().await?;

        let overdrawn = debit.is_overdrawn();
        info!(
            session_id = session.id,
            driver_id = session.driver_id,
            energy_kwh = session.energy_used,
            cost = session.cost,
            balance_after = debit.balance_after,
            "Charge session completed"
        );
        metrics::counter!("chargenet_sessions_completed_total").increment(1);
        if overdrawn {
            warn!(
                driver_id = session.driver_id,
                session_id = session.id,
                balance = debit.balance_after,
                "Wallet overdrawn by session debit"
            );
            metrics::counter!("chargenet_wallet_overdrawn_total").increment(1);
        }

        Ok(StopOutcome {
            session,
            debit,
            overdrawn,
            invoice,
        })
    }

    /// Operators only. Active and invoiced sessions are kept; an invoice
    /// racing in after the check is refused by its foreign key.
    pub async fn delete_session(&self, caller: &Caller, session_id: i32) -> DomainResult<()> {
        caller.require_operator()?;

        let sessions = SessionRepository::new(&self.db);
        let session = sessions.get(session_id).await?;

        if session.is_active() {
            return Err(DomainError::InvalidState(format!(
                "session {} is ACTIVE, stop it first",
                session_id
            )));
        }
        if let Some(invoice) = InvoiceRepository::new(&self.db)
            .find_by_session(session_id)
            .await?
        {
            return Err(DomainError::InvalidState(format!(
                "session {} is billed by invoice {}",
                session_id, invoice.id
            )));
        }

        sessions.delete(session_id).await?;

        info!(session_id, operator_id = caller.user_id, "Charge session deleted");
        Ok(())
    }

    pub async fn get_session(&self, caller: &Caller, session_id: i32) -> DomainResult<ChargeSession> {
        let session = SessionRepository::new(&self.db).get(session_id).await?;
        caller.require_driver_or_operator(session.driver_id)?;
        Ok(session)
    }

    /// The calling driver's sessions, most recent first.
    pub async fn list_driver_sessions(&self, caller: &Caller) -> DomainResult<Vec<ChargeSession>> {
        let driver_id = caller.require_driver()?;
        SessionRepository::new(&self.db).find_by_driver(driver_id).await
    }
}
