//! Vehicle and staff entities

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: i32,
    pub driver_id: i32,
    pub plate: String,
    pub model: Option<String>,
    pub connector_type: Option<String>,
}

impl Vehicle {
    pub fn ensure_owned_by(&self, driver_id: i32) -> DomainResult<()> {
        if self.driver_id != driver_id {
            return Err(DomainError::PermissionDenied(format!(
                "vehicle {} does not belong to driver {}",
                self.id, driver_id
            )));
        }
        Ok(())
    }
}

/// Station operator; may only act on the station they are assigned to.
#[derive(Debug, Clone)]
pub struct Staff {
    pub id: i32,
    pub name: String,
    pub station_id: i32,
}

impl Staff {
    pub fn ensure_assigned_to(&self, station_id: i32) -> DomainResult<()> {
        if self.station_id != station_id {
            return Err(DomainError::PermissionDenied(format!(
                "staff {} is assigned to station {}, not station {}",
                self.id, self.station_id, station_id
            )));
        }
        Ok(())
    }
}
