//! SeaORM repository for drivers and their stored balance

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QuerySelect, Set,
};

use crate::domain::wallet::Driver;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::driver;

pub struct DriverRepository<'a, C> {
    conn: &'a C,
}

fn model_to_domain(m: driver::Model) -> Driver {
    Driver {
        id: m.id,
        name: m.name,
        email: m.email,
        wallet_balance: m.wallet_balance,
        created_at: m.created_at,
    }
}

impl<'a, C: ConnectionTrait> DriverRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<Option<Driver>> {
        Ok(driver::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain))
    }

    pub async fn get(&self, id: i32) -> DomainResult<Driver> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Driver", id))
    }

    /// Read the driver row under an exclusive lock (see
    /// `ChargingPointRepository::get_for_update`).
    pub async fn get_for_update(&self, id: i32) -> DomainResult<Driver> {
        let touched = driver::Entity::update_many()
            .col_expr(
                driver::Column::WalletBalance,
                Expr::col(driver::Column::WalletBalance).into(),
            )
            .filter(driver::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        if touched.rows_affected == 0 {
            return Err(DomainError::not_found("Driver", id));
        }

        driver::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .ok_or_else(|| DomainError::not_found("Driver", id))
    }

    /// Register a driver; the wallet starts empty.
    pub async fn insert(&self, name: &str, email: &str) -> DomainResult<Driver> {
        let model = driver::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            wallet_balance: Set(0.0),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        Ok(model_to_domain(model))
    }

    /// `wallet_balance = wallet_balance + delta`, evaluated by the database.
    pub async fn increment_balance(&self, id: i32, delta: f64) -> DomainResult<()> {
        let result = driver::Entity::update_many()
            .col_expr(
                driver::Column::WalletBalance,
                Expr::col(driver::Column::WalletBalance).add(delta),
            )
            .filter(driver::Column::Id.eq(id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Driver", id));
        }
        Ok(())
    }
}
