//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_charging_stations;
mod m20240101_000002_create_charging_points;
mod m20240101_000003_create_drivers;
mod m20240101_000004_create_staff;
mod m20240101_000005_create_bookings;
mod m20240101_000006_create_charge_sessions;
mod m20240101_000007_create_payment_methods;
mod m20240101_000008_create_invoices;
mod m20240101_000009_create_wallet_entries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_charging_stations::Migration),
            Box::new(m20240101_000002_create_charging_points::Migration),
            Box::new(m20240101_000003_create_drivers::Migration),
            Box::new(m20240101_000004_create_staff::Migration),
            Box::new(m20240101_000005_create_bookings::Migration),
            Box::new(m20240101_000006_create_charge_sessions::Migration),
            Box::new(m20240101_000007_create_payment_methods::Migration),
            Box::new(m20240101_000008_create_invoices::Migration),
            Box::new(m20240101_000009_create_wallet_entries::Migration),
        ]
    }
}
