//! SeaORM repository for the append-only wallet ledger

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::domain::wallet::{LedgerEntry, LedgerEntryKind, WalletAdjustment};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::wallet_entry;

pub struct WalletEntryRepository<'a, C> {
    conn: &'a C,
}

fn model_to_domain(m: wallet_entry::Model) -> DomainResult<LedgerEntry> {
    Ok(LedgerEntry {
        id: m.id,
        driver_id: m.driver_id,
        kind: m.kind.parse()?,
        delta: m.delta,
        balance_before: m.balance_before,
        balance_after: m.balance_after,
        reference: m.reference,
        created_at: m.created_at,
    })
}

impl<'a, C: ConnectionTrait> WalletEntryRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Append one entry. A duplicate `reference` fails with AlreadyExists.
    pub async fn append(
        &self,
        driver_id: i32,
        kind: LedgerEntryKind,
        adjustment: &WalletAdjustment,
        reference: Option<String>,
    ) -> DomainResult<LedgerEntry> {
        let model = wallet_entry::ActiveModel {
            id: NotSet,
            driver_id: Set(driver_id),
            kind: Set(kind.as_str().to_string()),
            delta: Set(adjustment.delta),
            balance_before: Set(adjustment.balance_before),
            balance_after: Set(adjustment.balance_after),
            reference: Set(reference),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    /// Entries oldest first.
    pub async fn find_by_driver(&self, driver_id: i32) -> DomainResult<Vec<LedgerEntry>> {
        wallet_entry::Entity::find()
            .filter(wallet_entry::Column::DriverId.eq(driver_id))
            .order_by_asc(wallet_entry::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}
