//! Invoice issuer
//!
//! One invoice per completed session. Paying an invoice records how it was
//! settled; the session cost was already debited from the wallet at stop.

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::info;

use crate::domain::{ChargeSession, DomainError, DomainResult, Invoice, InvoiceStatus};
use crate::infrastructure::database::repositories::{
    InvoiceRepository, PaymentMethodRepository, SessionRepository,
};
use crate::shared::Caller;

/// Draft and insert the invoice for `session` on `conn`.
pub(crate) async fn issue_invoice<C: ConnectionTrait>(
    conn: &C,
    session: &ChargeSession,
) -> DomainResult<Invoice> {
    let invoices = InvoiceRepository::new(conn);
    if let Some(existing) = invoices.find_by_session(session.id).await? {
        return Err(DomainError::AlreadyExists(format!(
            "session {} already invoiced as invoice {}",
            session.id, existing.id
        )));
    }

    let draft = Invoice::draft_for(session, Utc::now())?;
    let invoice = invoices.insert(&draft).await?;

    info!(
        invoice_id = invoice.id,
        session_id = session.id,
        driver_id = invoice.driver_id,
        amount = invoice.amount,
        "Invoice issued"
    );
    metrics::counter!("chargenet_invoices_issued_total").increment(1);
    Ok(invoice)
}

pub struct InvoiceService {
    db: DatabaseConnection,
}

impl InvoiceService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn issue_for_session(&self, caller: &Caller, session_id: i32) -> DomainResult<Invoice> {
        let session = SessionRepository::new(&self.db).get(session_id).await?;
        caller.require_driver_or_operator(session.driver_id)?;
        issue_invoice(&self.db, &session).await
    }

    /// Settle an invoice with one of the caller's payment methods.
    pub async fn pay_invoice(
        &self,
        caller: &Caller,
        invoice_id: i32,
        payment_method_id: i32,
    ) -> DomainResult<Invoice> {
        let driver_id = caller.require_driver()?;

        let invoices = InvoiceRepository::new(&self.db);
        let mut invoice = invoices.get(invoice_id).await?;
        if invoice.driver_id != driver_id {
            return Err(DomainError::PermissionDenied(format!(
                "invoice {} belongs to another driver",
                invoice_id
            )));
        }

        let method = PaymentMethodRepository::new(&self.db)
            .get(payment_method_id)
            .await?;
        method.ensure_owned_by(driver_id)?;

        let paid_at = Utc::now();
        invoice.mark_paid(method.id, paid_at)?;
        if !invoices
            .mark_paid_if_pending(invoice_id, method.id, paid_at)
            .await?
        {
            return Err(DomainError::InvalidState(format!(
                "invoice {} already paid",
                invoice_id
            )));
        }

        info!(
            invoice_id,
            driver_id,
            payment_method_id = method.id,
            amount = invoice.amount,
            "Invoice paid"
        );
        metrics::counter!("chargenet_invoices_paid_total").increment(1);
        Ok(invoice)
    }

    pub async fn get_invoice(&self, caller: &Caller, invoice_id: i32) -> DomainResult<Invoice> {
        let invoice = InvoiceRepository::new(&self.db).get(invoice_id).await?;
        caller.require_driver_or_operator(invoice.driver_id)?;
        Ok(invoice)
    }

    /// Operators only. A PAID invoice is a settlement record and stays;
    /// removing a PENDING one frees its session for deletion.
    pub async fn delete_invoice(&self, caller: &Caller, invoice_id: i32) -> DomainResult<()> {
        caller.require_operator()?;

        let invoices = InvoiceRepository::new(&self.db);
        let invoice = invoices.get(invoice_id).await?;
        if invoice.status == InvoiceStatus::Paid || !invoices.delete_if_pending(invoice_id).await? {
            return Err(DomainError::InvalidState(format!(
                "invoice {} is no longer PENDING",
                invoice_id
            )));
        }

        info!(
            invoice_id,
            session_id = invoice.session_id,
            operator_id = caller.user_id,
            "Invoice deleted"
        );
        Ok(())
    }

    /// The calling driver's invoices, newest first.
    pub async fn list_invoices(&self, caller: &Caller) -> DomainResult<Vec<Invoice>> {
        let driver_id = caller.require_driver()?;
        InvoiceRepository::new(&self.db).find_by_driver(driver_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::SessionService;
    use crate::application::test_support::{completed_session, seed, test_db};
    use crate::domain::EnergyRate;

    #[tokio::test]
    async fn invoice_matches_session_and_is_issued_once() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let session = completed_session(&db, &fx, 10.0).await;
        let service = InvoiceService::new(db);
        let a = Caller::driver(fx.driver_a);

        let invoice = service.issue_for_session(&a, session.id).await.unwrap();
        assert_eq!(invoice.amount, 10.0);
        assert_eq!(invoice.total_energy, 10.0);
        assert_eq!(invoice.status, InvoiceStatus::Pending);

        let err = service.issue_for_session(&a, session.id).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
        assert_eq!(service.list_invoices(&a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unique_index_backs_the_existence_check() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let session = completed_session(&db, &fx, 4.0).await;

        let draft = Invoice::draft_for(&session, Utc::now()).unwrap();
        let repo = InvoiceRepository::new(&db);
        repo.insert(&draft).await.unwrap();
        let err = repo.insert(&draft).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn active_session_cannot_be_invoiced() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let session = SessionRepository::new(&db)
            .insert_active(fx.driver_a, fx.vehicle_a, fx.point, fx.station_x, Utc::now())
            .await
            .unwrap();
        let service = InvoiceService::new(db);

        let err = service
            .issue_for_session(&Caller::driver(fx.driver_a), session.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn paying_records_method_once() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let session = completed_session(&db, &fx, 2.0).await;
        let service = InvoiceService::new(db);
        let a = Caller::driver(fx.driver_a);

        let invoice = service.issue_for_session(&a, session.id).await.unwrap();

        let err = service
            .pay_invoice(&a, invoice.id, fx.method_b)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        let err = service
            .pay_invoice(&Caller::driver(fx.driver_b), invoice.id, fx.method_b)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        let paid = service.pay_invoice(&a, invoice.id, fx.method_a).await.unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(paid.payment_method_id, Some(fx.method_a));
        assert!(paid.paid_at.is_some());

        let err = service
            .pay_invoice(&a, invoice.id, fx.method_a)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        let stored = service.get_invoice(&a, invoice.id).await.unwrap();
        assert_eq!(stored.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn pending_invoice_deletion_frees_the_session() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let session = completed_session(&db, &fx, 5.0).await;
        let service = InvoiceService::new(db.clone());
        let sessions = SessionService::new(
            db,
            EnergyRate::per_kwh(1.0).unwrap(),
            false,
            Default::default(),
        );
        let staff = Caller::staff(fx.staff_x);

        let invoice = service
            .issue_for_session(&Caller::driver(fx.driver_a), session.id)
            .await
            .unwrap();
        let err = sessions.delete_session(&staff, session.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        let err = service
            .delete_invoice(&Caller::driver(fx.driver_a), invoice.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        service.delete_invoice(&staff, invoice.id).await.unwrap();
        let err = service.delete_invoice(&staff, invoice.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        sessions.delete_session(&staff, session.id).await.unwrap();
    }

    #[tokio::test]
    async fn paid_invoice_is_kept() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let session = completed_session(&db, &fx, 1.5).await;
        let service = InvoiceService::new(db);
        let a = Caller::driver(fx.driver_a);

        let invoice = service.issue_for_session(&a, session.id).await.unwrap();
        service.pay_invoice(&a, invoice.id, fx.method_a).await.unwrap();

        let err = service
            .delete_invoice(&Caller::admin(1), invoice.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(
            service.get_invoice(&a, invoice.id).await.unwrap().status,
            InvoiceStatus::Paid
        );
    }
}
