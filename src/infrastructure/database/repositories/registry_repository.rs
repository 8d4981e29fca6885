//! Read access to the registry tables (stations, vehicles, staff).
//!
//! The registry is owned by an external onboarding flow; the insert
//! helpers exist for seeding.

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::domain::charging_point::{ChargingStation, StationStatus};
use crate::domain::fleet::{Staff, Vehicle};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{charging_station, staff, vehicle};

// ── Stations ───────────────────────────────────────────────────

pub struct StationRepository<'a, C> {
    conn: &'a C,
}

fn station_to_domain(m: charging_station::Model) -> DomainResult<ChargingStation> {
    Ok(ChargingStation {
        id: m.id,
        name: m.name,
        location: m.location,
        status: m.status.parse()?,
    })
}

impl<'a, C: ConnectionTrait> StationRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> DomainResult<ChargingStation> {
        charging_station::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(station_to_domain)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("ChargingStation", id))
    }

    pub async fn insert(&self, name: &str, location: Option<&str>) -> DomainResult<ChargingStation> {
        let model = charging_station::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            location: Set(location.map(str::to_string)),
            status: Set(StationStatus::Available.as_str().to_string()),
        }
        .insert(self.conn)
        .await?;
        station_to_domain(model)
    }
}

// ── Vehicles ───────────────────────────────────────────────────

pub struct VehicleRepository<'a, C> {
    conn: &'a C,
}

fn vehicle_to_domain(m: vehicle::Model) -> Vehicle {
    Vehicle {
        id: m.id,
        driver_id: m.driver_id,
        plate: m.plate,
        model: m.model,
        connector_type: m.connector_type,
    }
}

impl<'a, C: ConnectionTrait> VehicleRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> DomainResult<Vehicle> {
        vehicle::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(vehicle_to_domain)
            .ok_or_else(|| DomainError::not_found("Vehicle", id))
    }

    pub async fn find_by_driver(&self, driver_id: i32) -> DomainResult<Vec<Vehicle>> {
        Ok(vehicle::Entity::find()
            .filter(vehicle::Column::DriverId.eq(driver_id))
            .order_by_asc(vehicle::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(vehicle_to_domain)
            .collect())
    }

    pub async fn insert(&self, driver_id: i32, plate: &str) -> DomainResult<Vehicle> {
        let model = vehicle::ActiveModel {
            id: NotSet,
            driver_id: Set(driver_id),
            plate: Set(plate.to_string()),
            model: Set(None),
            connector_type: Set(None),
        }
        .insert(self.conn)
        .await?;
        Ok(vehicle_to_domain(model))
    }
}

// ── Staff ──────────────────────────────────────────────────────

pub struct StaffRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> StaffRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> DomainResult<Staff> {
        staff::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(|m| Staff {
                id: m.id,
                name: m.name,
                station_id: m.station_id,
            })
            .ok_or_else(|| DomainError::not_found("Staff", id))
    }

    pub async fn insert(&self, name: &str, station_id: i32) -> DomainResult<Staff> {
        let model = staff::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            station_id: Set(station_id),
        }
        .insert(self.conn)
        .await?;
        Ok(Staff {
            id: model.id,
            name: model.name,
            station_id: model.station_id,
        })
    }
}
