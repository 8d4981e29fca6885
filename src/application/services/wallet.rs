//! Wallet ledger
//!
//! The stored balance is only ever changed by `apply_adjustment`, which
//! writes the increment and its ledger entry on the same connection.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::application::requests::{check_amount, TopUpRequest};
use crate::domain::{
    DomainError, DomainResult, LedgerAudit, LedgerEntry, LedgerEntryKind, PaymentGateway,
    WalletAdjustment,
};
use crate::infrastructure::database::repositories::{
    DriverRepository, PaymentMethodRepository, WalletEntryRepository,
};
use crate::shared::{Caller, KeyedLocks};

/// Lock the driver row, increment the balance in the database and append
/// the matching ledger entry. Run it inside a transaction opened while
/// holding the driver's entry in the shared driver locks.
pub(crate) async fn apply_adjustment<C: ConnectionTrait>(
    conn: &C,
    driver_id: i32,
    delta: f64,
    kind: LedgerEntryKind,
    reference: Option<String>,
) -> DomainResult<WalletAdjustment> {
    let drivers = DriverRepository::new(conn);
    let driver = drivers.get_for_update(driver_id).await?;

    let adjustment = WalletAdjustment::new(driver.wallet_balance, delta);
    drivers.increment_balance(driver_id, delta).await?;
    WalletEntryRepository::new(conn)
        .append(driver_id, kind, &adjustment, reference)
        .await?;

    debug!(
        driver_id,
        kind = kind.as_str(),
        before = adjustment.balance_before,
        delta,
        after = adjustment.balance_after,
        "Wallet adjusted"
    );
    Ok(adjustment)
}

/// Balance changes for one driver are serialized through `driver_locks`,
/// which is shared with session stop.
pub struct WalletService {
    db: DatabaseConnection,
    gateway: Arc<dyn PaymentGateway>,
    driver_locks: Arc<KeyedLocks<i32>>,
}

impl WalletService {
    pub fn new(
        db: DatabaseConnection,
        gateway: Arc<dyn PaymentGateway>,
        driver_locks: Arc<KeyedLocks<i32>>,
    ) -> Self {
        Self {
            db,
            gateway,
            driver_locks,
        }
    }

    /// Manual correction by an admin.
    pub async fn adjust(
        &self,
        caller: &Caller,
        driver_id: i32,
        delta: f64,
    ) -> DomainResult<WalletAdjustment> {
        caller.require_admin()?;
        check_amount("delta", delta)?;

        let _guard = self.driver_locks.lock(driver_id).await;
        let txn = self.db.begin().await?;
        let adjustment =
            apply_adjustment(&txn, driver_id, delta, LedgerEntryKind::Adjustment, None).await?;
        txn.commit().await?;

        info!(
            driver_id,
            delta,
            balance_after = adjustment.balance_after,
            admin_id = caller.user_id,
            "Manual wallet adjustment"
        );
        if adjustment.is_overdrawn() {
            warn!(driver_id, balance = adjustment.balance_after, "Wallet overdrawn");
            metrics::counter!("chargenet_wallet_overdrawn_total").increment(1);
        }
        Ok(adjustment)
    }

    /// Charge the method through the gateway, then credit the wallet. A
    /// declined charge leaves the balance untouched.
    pub async fn top_up(
        &self,
        caller: &Caller,
        request: TopUpRequest,
    ) -> DomainResult<WalletAdjustment> {
        let driver_id = caller.require_driver()?;
        request.validate()?;
        check_amount("amount", request.amount)?;

        let method = PaymentMethodRepository::new(&self.db)
            .get(request.payment_method_id)
            .await?;
        method.ensure_owned_by(driver_id)?;

        let confirmation = self.gateway.charge(&method, request.amount).await?;
        if !confirmation.approved {
            warn!(
                driver_id,
                payment_method_id = method.id,
                amount = request.amount,
                "Top-up declined by gateway"
            );
            return Err(DomainError::PaymentDeclined(format!(
                "gateway declined {} on payment method {} (ref {})",
                request.amount, method.id, confirmation.reference
            )));
        }

        let credited = self
            .credit_top_up(driver_id, request.amount, &confirmation.reference)
            .await;
        let adjustment = match credited {
            Ok(adjustment) => adjustment,
            Err(e) => {
                // charged but not credited, needs reconciliation
                error!(
                    driver_id,
                    payment_method_id = method.id,
                    amount = request.amount,
                    reference = confirmation.reference.as_str(),
                    error = %e,
                    "Approved top-up could not be credited"
                );
                metrics::counter!("chargenet_topup_credit_failures_total").increment(1);
                return Err(e);
            }
        };

        info!(
            driver_id,
            amount = request.amount,
            balance_after = adjustment.balance_after,
            reference = confirmation.reference.as_str(),
            "Wallet topped up"
        );
        Ok(adjustment)
    }

    async fn credit_top_up(
        &self,
        driver_id: i32,
        amount: f64,
        gateway_reference: &str,
    ) -> DomainResult<WalletAdjustment> {
        let _guard = self.driver_locks.lock(driver_id).await;
        let txn = self.db.begin().await?;
        let adjustment = apply_adjustment(
            &txn,
            driver_id,
            amount,
            LedgerEntryKind::TopUp,
            Some(LedgerEntry::top_up_reference(gateway_reference)),
        )
        .await?;
        txn.commit().await?;
        Ok(adjustment)
    }

    pub async fn balance(&self, caller: &Caller, driver_id: i32) -> DomainResult<f64> {
        caller.require_driver_or_operator(driver_id)?;
        let driver = DriverRepository::new(&self.db).get(driver_id).await?;
        Ok(driver.wallet_balance)
    }

    /// Ledger entries, oldest first.
    pub async fn history(&self, caller: &Caller, driver_id: i32) -> DomainResult<Vec<LedgerEntry>> {
        caller.require_driver_or_operator(driver_id)?;
        DriverRepository::new(&self.db).get(driver_id).await?;
        WalletEntryRepository::new(&self.db)
            .find_by_driver(driver_id)
            .await
    }

    pub async fn audit(&self, caller: &Caller, driver_id: i32) -> DomainResult<LedgerAudit> {
        caller.require_driver_or_operator(driver_id)?;

        let txn = self.db.begin().await?;
        let driver = DriverRepository::new(&txn).get(driver_id).await?;
        let entries = WalletEntryRepository::new(&txn)
            .find_by_driver(driver_id)
            .await?;
        txn.commit().await?;

        let audit = LedgerAudit::replay(driver_id, driver.wallet_balance, &entries);
        if !audit.is_consistent() {
            warn!(
                driver_id,
                stored = audit.stored_balance,
                replayed = audit.replayed_balance,
                broken_at = ?audit.broken_at,
                "Wallet ledger does not match stored balance"
            );
        }
        Ok(audit)
    }
}
