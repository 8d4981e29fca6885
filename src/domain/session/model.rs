//! Charge session domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(DomainError::Storage(format!(
                "unknown session status '{}'",
                other
            ))),
        }
    }
}

/// Deployment-wide price per kWh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyRate(f64);

impl EnergyRate {
    pub fn per_kwh(rate: f64) -> DomainResult<Self> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(DomainError::Validation(format!(
                "rate per kWh must be a non-negative number, got {}",
                rate
            )));
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn cost_of(&self, energy_kwh: f64) -> f64 {
        energy_kwh * self.0
    }
}

#[derive(Debug, Clone)]
pub struct ChargeSession {
    pub id: i32,
    pub driver_id: i32,
    pub vehicle_id: i32,
    pub point_id: i32,
    pub station_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// kWh delivered; 0 while active
    pub energy_used: f64,
    pub cost: f64,
    pub status: SessionStatus,
}

impl ChargeSession {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Close the session. Terminal: a completed session is never reopened.
    pub fn complete(
        &mut self,
        energy_kwh: f64,
        rate: EnergyRate,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.is_active() {
            return Err(DomainError::InvalidState(format!(
                "session {} is {}, not ACTIVE",
                self.id, self.status
            )));
        }
        if !energy_kwh.is_finite() || energy_kwh < 0.0 {
            return Err(DomainError::Validation(format!(
                "energy used must be >= 0 kWh, got {}",
                energy_kwh
            )));
        }

        self.end_time = Some(at);
        self.energy_used = energy_kwh;
        self.cost = rate.cost_of(energy_kwh);
        self.status = SessionStatus::Completed;
        Ok(())
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.end_time.map(|end| (end - self.start_time).num_seconds())
    }
}

// ── Tests ──────────────────────────────────────────────────────
