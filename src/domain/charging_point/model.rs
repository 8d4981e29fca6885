//! Charging point and station entities

use std::fmt;
use std::str::FromStr;

use crate::shared::errors::{DomainError, DomainResult};

/// Point status. Only sessions move a point into or out of `Charging`;
/// operators own the other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    Available,
    Charging,
    Reserved,
    Offline,
    Unavailable,
}

impl Default for PointStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl PointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Charging => "CHARGING",
            Self::Reserved => "RESERVED",
            Self::Offline => "OFFLINE",
            Self::Unavailable => "UNAVAILABLE",
        }
    }

    /// Session start: exactly `Available` → `Charging`.
    pub fn begin_charging(self) -> DomainResult<PointStatus> {
        match self {
            Self::Available => Ok(Self::Charging),
            other => Err(DomainError::InvalidState(format!(
                "point not available (status {})",
                other
            ))),
        }
    }

    /// Session stop releases the point from any substate.
    pub fn release(self) -> PointStatus {
        Self::Available
    }

    /// Operator-driven change. `Charging` is neither a legal target nor a
    /// state an operator may leave.
    pub fn operator_set(self, target: PointStatus) -> DomainResult<PointStatus> {
        match (self, target) {
            (_, Self::Charging) => Err(DomainError::InvalidState(
                "only a charging session may put a point into CHARGING".to_string(),
            )),
            (Self::Charging, _) => Err(DomainError::InvalidState(
                "point is occupied by an active session".to_string(),
            )),
            (_, target) => Ok(target),
        }
    }
}

impl fmt::Display for PointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(Self::Available),
            "CHARGING" => Ok(Self::Charging),
            "RESERVED" => Ok(Self::Reserved),
            "OFFLINE" => Ok(Self::Offline),
            "UNAVAILABLE" => Ok(Self::Unavailable),
            other => Err(DomainError::Storage(format!(
                "unknown point status '{}'",
                other
            ))),
        }
    }
}

/// Informational station status; not derived from point states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStatus {
    Available,
    InUse,
    Offline,
    Faulted,
}

impl StationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::InUse => "IN_USE",
            Self::Offline => "OFFLINE",
            Self::Faulted => "FAULTED",
        }
    }
}

impl FromStr for StationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(Self::Available),
            "IN_USE" => Ok(Self::InUse),
            "OFFLINE" => Ok(Self::Offline),
            "FAULTED" => Ok(Self::Faulted),
            other => Err(DomainError::Storage(format!(
                "unknown station status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChargingStation {
    pub id: i32,
    pub name: String,
    pub location: Option<String>,
    pub status: StationStatus,
}

#[derive(Debug, Clone)]
pub struct ChargingPoint {
    pub id: i32,
    pub station_id: i32,
    pub connector_type: String,
    /// Rated power in kW
    pub power_kw: f64,
    pub status: PointStatus,
}

impl ChargingPoint {
    pub fn is_available(&self) -> bool {
        self.status == PointStatus::Available
    }
}

// ── Tests ──────────────────────────────────────────────────────
