//! SeaORM repository for stored payment methods

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::domain::payment::{PaymentMethod, PaymentType};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::payment_method;

pub struct PaymentMethodRepository<'a, C> {
    conn: &'a C,
}

fn model_to_domain(m: payment_method::Model) -> DomainResult<PaymentMethod> {
    Ok(PaymentMethod {
        id: m.id,
        driver_id: m.driver_id,
        payment_type: m.payment_type.parse()?,
        provider: m.provider,
        is_default: m.is_default,
        created_at: m.created_at,
    })
}

impl<'a, C: ConnectionTrait> PaymentMethodRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<Option<PaymentMethod>> {
        payment_method::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<PaymentMethod> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("PaymentMethod", id))
    }

    pub async fn find_by_driver(&self, driver_id: i32) -> DomainResult<Vec<PaymentMethod>> {
        payment_method::Entity::find()
            .filter(payment_method::Column::DriverId.eq(driver_id))
            .order_by_asc(payment_method::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    pub async fn insert(
        &self,
        driver_id: i32,
        payment_type: PaymentType,
        provider: &str,
        is_default: bool,
    ) -> DomainResult<PaymentMethod> {
        let model = payment_method::ActiveModel {
            id: NotSet,
            driver_id: Set(driver_id),
            payment_type: Set(payment_type.as_str().to_string()),
            provider: Set(provider.to_string()),
            is_default: Set(is_default),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = payment_method::Entity::delete_by_id(id)
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("PaymentMethod", id));
        }
        Ok(())
    }

    /// Clear the default flag on every method of `driver_id`.
    pub async fn clear_default(&self, driver_id: i32) -> DomainResult<u64> {
        let result = payment_method::Entity::update_many()
            .col_expr(payment_method::Column::IsDefault, Expr::value(false))
            .filter(payment_method::Column::DriverId.eq(driver_id))
            .filter(payment_method::Column::IsDefault.eq(true))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn set_default(&self, id: i32) -> DomainResult<()> {
        payment_method::Entity::update_many()
            .col_expr(payment_method::Column::IsDefault, Expr::value(true))
            .filter(payment_method::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(())
    }
}
