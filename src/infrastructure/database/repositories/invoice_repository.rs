//! SeaORM repository for invoices

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::invoice;

pub struct InvoiceRepository<'a, C> {
    conn: &'a C,
}

fn model_to_domain(m: invoice::Model) -> DomainResult<Invoice> {
    Ok(Invoice {
        id: m.id,
        session_id: m.session_id,
        driver_id: m.driver_id,
        issue_date: m.issue_date,
        total_energy: m.total_energy,
        amount: m.amount,
        payment_method_id: m.payment_method_id,
        status: m.status.parse()?,
        paid_at: m.paid_at,
    })
}

impl<'a, C: ConnectionTrait> InvoiceRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<Option<Invoice>> {
        invoice::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<Invoice> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Invoice", id))
    }

    pub async fn find_by_session(&self, session_id: i32) -> DomainResult<Option<Invoice>> {
        invoice::Entity::find()
            .filter(invoice::Column::SessionId.eq(session_id))
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn find_by_driver(&self, driver_id: i32) -> DomainResult<Vec<Invoice>> {
        invoice::Entity::find()
            .filter(invoice::Column::DriverId.eq(driver_id))
            .order_by_desc(invoice::Column::IssueDate)
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    /// Insert a drafted invoice. The unique index on `session_id` turns a
    /// second insert for the same session into AlreadyExists.
    pub async fn insert(&self, draft: &Invoice) -> DomainResult<Invoice> {
        let model = invoice::ActiveModel {
            id: NotSet,
            session_id: Set(draft.session_id),
            driver_id: Set(draft.driver_id),
            issue_date: Set(draft.issue_date),
            total_energy: Set(draft.total_energy),
            amount: Set(draft.amount),
            payment_method_id: Set(draft.payment_method_id),
            status: Set(draft.status.as_str().to_string()),
            paid_at: Set(draft.paid_at),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    /// Write PAID only over a PENDING row; false if it was already paid.
    pub async fn mark_paid_if_pending(
        &self,
        id: i32,
        payment_method_id: i32,
        paid_at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let result = invoice::Entity::update_many()
            .col_expr(invoice::Column::PaymentMethodId, Expr::value(payment_method_id))
            .col_expr(invoice::Column::PaidAt, Expr::value(paid_at))
            .col_expr(invoice::Column::Status, Expr::value(InvoiceStatus::Paid.as_str()))
            .filter(invoice::Column::Id.eq(id))
            .filter(invoice::Column::Status.eq(InvoiceStatus::Pending.as_str()))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Remove the invoice only while it is still PENDING.
    pub async fn delete_if_pending(&self, id: i32) -> DomainResult<bool> {
        let result = invoice::Entity::delete_many()
            .filter(invoice::Column::Id.eq(id))
            .filter(invoice::Column::Status.eq(InvoiceStatus::Pending.as_str()))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
