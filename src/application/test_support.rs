//! Test databases and fixtures shared by service tests.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use crate::domain::{
    ChargeSession, DomainResult, EnergyRate, PaymentConfirmation, PaymentGateway, PaymentMethod,
    PaymentType,
};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::{
    ChargingPointRepository, DriverRepository, PaymentMethodRepository, SessionRepository,
    StaffRepository, StationRepository, VehicleRepository,
};
use crate::infrastructure::database::{init_database, DatabaseConfig};

/// Ids of the seeded registry. Station X has `point` and `other_point`,
/// station Y has `point_y`.
#[derive(Debug, Clone, Copy)]
pub struct Fixtures {
    pub station_x: i32,
    pub station_y: i32,
    pub point: i32,
    pub other_point: i32,
    pub point_y: i32,
    pub driver_a: i32,
    pub driver_b: i32,
    pub vehicle_a: i32,
    pub vehicle_b: i32,
    pub staff_x: i32,
    pub staff_y: i32,
    pub method_a: i32,
    pub method_b: i32,
}

pub async fn test_db() -> DatabaseConnection {
    let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// File-backed database behind a pool of several connections, so
/// concurrent tasks really run interleaved transactions. The file is
/// removed on drop.
pub struct PooledDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

const POOLED_CONNECTIONS: u32 = 4;

pub async fn pooled_test_db() -> PooledDb {
    let path = std::env::temp_dir().join(format!("chargenet-test-{}.db", Uuid::new_v4()));
    let config = DatabaseConfig {
        max_connections: POOLED_CONNECTIONS,
        ..DatabaseConfig::sqlite(&path.to_string_lossy())
    };
    let db = init_database(&config).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    PooledDb { db, path }
}

impl Drop for PooledDb {
    fn drop(&mut self) {
        for suffix in ["", "-journal", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub async fn seed(db: &DatabaseConnection) -> Fixtures {
    let stations = StationRepository::new(db);
    let station_x = stations.insert("Station X", Some("North")).await.unwrap().id;
    let station_y = stations.insert("Station Y", None).await.unwrap().id;

    let points = ChargingPointRepository::new(db);
    let point = points.insert(station_x, "CCS2", 50.0).await.unwrap().id;
    let other_point = points.insert(station_x, "Type2", 22.0).await.unwrap().id;
    let point_y = points.insert(station_y, "CCS2", 150.0).await.unwrap().id;

    let drivers = DriverRepository::new(db);
    let driver_a = drivers.insert("Alice", "alice@example.com").await.unwrap().id;
    let driver_b = drivers.insert("Bob", "bob@example.com").await.unwrap().id;

    let vehicles = VehicleRepository::new(db);
    let vehicle_a = vehicles.insert(driver_a, "AA-001").await.unwrap().id;
    let vehicle_b = vehicles.insert(driver_b, "BB-002").await.unwrap().id;

    let staff = StaffRepository::new(db);
    let staff_x = staff.insert("Xavier", station_x).await.unwrap().id;
    let staff_y = staff.insert("Yuki", station_y).await.unwrap().id;

    let methods = PaymentMethodRepository::new(db);
    let method_a = methods
        .insert(driver_a, PaymentType::Card, "visa", false)
        .await
        .unwrap()
        .id;
    let method_b = methods
        .insert(driver_b, PaymentType::EWallet, "paypal", false)
        .await
        .unwrap()
        .id;

    Fixtures {
        station_x,
        station_y,
        point,
        other_point,
        point_y,
        driver_a,
        driver_b,
        vehicle_a,
        vehicle_b,
        staff_x,
        staff_y,
        method_a,
        method_b,
    }
}

/// A COMPLETED session of driver A on `point`, written directly at a rate
/// of 1.0 per kWh. Neither the point nor the wallet is touched.
pub async fn completed_session(
    db: &DatabaseConnection,
    fx: &Fixtures,
    energy_kwh: f64,
) -> ChargeSession {
    let repo = SessionRepository::new(db);
    let mut session = repo
        .insert_active(fx.driver_a, fx.vehicle_a, fx.point, fx.station_x, Utc::now())
        .await
        .unwrap();
    session
        .complete(energy_kwh, EnergyRate::per_kwh(1.0).unwrap(), Utc::now())
        .unwrap();
    assert!(repo.complete_if_active(&session).await.unwrap());
    session
}

/// Gateway refusing every charge.
pub struct DecliningGateway;

#[async_trait]
impl PaymentGateway for DecliningGateway {
    async fn charge(&self, method: &PaymentMethod, _amount: f64) -> DomainResult<PaymentConfirmation> {
        Ok(PaymentConfirmation {
            approved: false,
            reference: format!("declined-{}", method.id),
        })
    }
}
