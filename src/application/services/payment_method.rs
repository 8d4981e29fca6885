//! Driver payment methods

use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;
use validator::Validate;

use crate::application::requests::CreatePaymentMethodRequest;
use crate::domain::{DomainResult, PaymentMethod};
use crate::infrastructure::database::repositories::{DriverRepository, PaymentMethodRepository};
use crate::shared::{Caller, KeyedLocks};

/// Default flag changes are serialized per driver so at most one method
/// is ever marked default.
pub struct PaymentMethodService {
    db: DatabaseConnection,
    driver_locks: Arc<KeyedLocks<i32>>,
}

impl PaymentMethodService {
    pub fn new(db: DatabaseConnection, driver_locks: Arc<KeyedLocks<i32>>) -> Self {
        Self { db, driver_locks }
    }

    pub async fn create(
        &self,
        caller: &Caller,
        request: CreatePaymentMethodRequest,
    ) -> DomainResult<PaymentMethod> {
        let driver_id = caller.require_driver()?;
        request.validate()?;
        DriverRepository::new(&self.db).get(driver_id).await?;

        let _guard = self.driver_locks.lock(driver_id).await;
        let txn = self.db.begin().await?;
        let methods = PaymentMethodRepository::new(&txn);
        if request.is_default {
            methods.clear_default(driver_id).await?;
        }
        let method = methods
            .insert(
                driver_id,
                request.payment_type,
                &request.provider,
                request.is_default,
            )
            .await?;
        txn.commit().await?;

        info!(
            payment_method_id = method.id,
            driver_id,
            payment_type = method.payment_type.as_str(),
            is_default = method.is_default,
            "Payment method added"
        );
        Ok(method)
    }

    pub async fn list(&self, caller: &Caller) -> DomainResult<Vec<PaymentMethod>> {
        let driver_id = caller.require_driver()?;
        PaymentMethodRepository::new(&self.db)
            .find_by_driver(driver_id)
            .await
    }

    /// Paid invoices keep their row; their method reference is cleared.
    pub async fn delete(&self, caller: &Caller, payment_method_id: i32) -> DomainResult<()> {
        let driver_id = caller.require_driver()?;
        let _guard = self.driver_locks.lock(driver_id).await;

        let methods = PaymentMethodRepository::new(&self.db);
        methods.get(payment_method_id).await?.ensure_owned_by(driver_id)?;
        methods.delete(payment_method_id).await?;

        info!(payment_method_id, driver_id, "Payment method removed");
        Ok(())
    }

    pub async fn set_default(
        &self,
        caller: &Caller,
        payment_method_id: i32,
    ) -> DomainResult<PaymentMethod> {
        let driver_id = caller.require_driver()?;
        let _guard = self.driver_locks.lock(driver_id).await;

        let mut method = PaymentMethodRepository::new(&self.db)
            .get(payment_method_id)
            .await?;
        method.ensure_owned_by(driver_id)?;

        let txn = self.db.begin().await?;
        let methods = PaymentMethodRepository::new(&txn);
        let cleared = methods.clear_default(driver_id).await?;
        methods.set_default(payment_method_id).await?;
        txn.commit().await?;

        method.is_default = true;
        info!(payment_method_id, driver_id, cleared, "Default payment method set");
        Ok(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{pooled_test_db, seed, test_db};
    use crate::domain::{DomainError, PaymentType};

    fn card(provider: &str, is_default: bool) -> CreatePaymentMethodRequest {
        CreatePaymentMethodRequest {
            payment_type: PaymentType::Card,
            provider: provider.to_string(),
            is_default,
        }
    }

    fn defaults(methods: &[PaymentMethod]) -> usize {
        methods.iter().filter(|m| m.is_default).count()
    }

    #[tokio::test]
    async fn new_default_replaces_old_default() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = PaymentMethodService::new(db, Arc::default());
        let a = Caller::driver(fx.driver_a);

        let first = service.create(&a, card("visa", true)).await.unwrap();
        let second = service.create(&a, card("mastercard", true)).await.unwrap();

        let methods = service.list(&a).await.unwrap();
        assert_eq!(defaults(&methods), 1);
        assert!(methods.iter().any(|m| m.id == second.id && m.is_default));

        service.set_default(&a, first.id).await.unwrap();
        let methods = service.list(&a).await.unwrap();
        assert_eq!(defaults(&methods), 1);
        assert!(methods.iter().any(|m| m.id == first.id && m.is_default));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_set_default_keeps_one_default() {
        let pooled = pooled_test_db().await;
        let fx = seed(&pooled.db).await;
        let service = Arc::new(PaymentMethodService::new(pooled.db.clone(), Arc::default()));
        let a = Caller::driver(fx.driver_a);

        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(service.create(&a, card(&format!("p{i}"), false)).await.unwrap().id);
        }

        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.set_default(&a, id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(defaults(&service.list(&a).await.unwrap()), 1);
    }

    #[tokio::test]
    async fn foreign_methods_cannot_be_touched() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = PaymentMethodService::new(db, Arc::default());
        let a = Caller::driver(fx.driver_a);

        let err = service.set_default(&a, fx.method_b).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
        let err = service.delete(&a, fx.method_b).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        service.delete(&a, fx.method_a).await.unwrap();
        let err = service.delete(&a, fx.method_a).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn blank_provider_is_invalid() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let service = PaymentMethodService::new(db, Arc::default());

        let err = service
            .create(&Caller::driver(fx.driver_a), card("", false))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
