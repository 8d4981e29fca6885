//! Invoice domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::session::{ChargeSession, SessionStatus};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            other => Err(DomainError::Storage(format!(
                "unknown invoice status '{}'",
                other
            ))),
        }
    }
}

/// Billing record for exactly one completed session.
#[derive(Debug, Clone)]
pub struct Invoice {
    pub id: i32,
    pub session_id: i32,
    pub driver_id: i32,
    pub issue_date: DateTime<Utc>,
    /// kWh billed
    pub total_energy: f64,
    pub amount: f64,
    pub payment_method_id: Option<i32>,
    pub status: InvoiceStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Draft an unsaved invoice (`id == 0`) for a completed session.
    pub fn draft_for(session: &ChargeSession, issue_date: DateTime<Utc>) -> DomainResult<Self> {
        if session.status != SessionStatus::Completed {
            return Err(DomainError::InvalidState(format!(
                "session {} is {}, only COMPLETED sessions can be invoiced",
                session.id, session.status
            )));
        }

        Ok(Self {
            id: 0,
            session_id: session.id,
            driver_id: session.driver_id,
            issue_date,
            total_energy: session.energy_used,
            amount: session.cost,
            payment_method_id: None,
            status: InvoiceStatus::Pending,
            paid_at: None,
        })
    }

    /// PENDING → PAID, exactly once.
    pub fn mark_paid(&mut self, payment_method_id: i32, at: DateTime<Utc>) -> DomainResult<()> {
        if self.status == InvoiceStatus::Paid {
            return Err(DomainError::InvalidState(format!(
                "invoice {} already paid",
                self.id
            )));
        }
        self.payment_method_id = Some(payment_method_id);
        self.status = InvoiceStatus::Paid;
        self.paid_at = Some(at);
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::EnergyRate;

    fn session() -> ChargeSession {
        ChargeSession {
            id: 9,
            driver_id: 3,
            vehicle_id: 1,
            point_id: 1,
            station_id: 1,
            start_time: Utc::now(),
            end_time: None,
            energy_used: 0.0,
            cost: 0.0,
            status: SessionStatus::Active,
        }
    }

    #[test]
    fn active_session_cannot_be_invoiced() {
        let err = Invoice::draft_for(&session(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn draft_copies_energy_and_cost() {
        let mut s = session();
        s.complete(10.0, EnergyRate::per_kwh(1.0).unwrap(), Utc::now()).unwrap();

        let invoice = Invoice::draft_for(&s, Utc::now()).unwrap();
        assert_eq!(invoice.session_id, 9);
        assert_eq!(invoice.driver_id, 3);
        assert_eq!(invoice.total_energy, 10.0);
        assert_eq!(invoice.amount, 10.0);
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert!(invoice.payment_method_id.is_none());
    }

    #[test]
    fn pays_exactly_once() {
        let mut s = session();
        s.complete(2.0, EnergyRate::per_kwh(1.0).unwrap(), Utc::now()).unwrap();
        let mut invoice = Invoice::draft_for(&s, Utc::now()).unwrap();

        invoice.mark_paid(4, Utc::now()).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.payment_method_id, Some(4));

        let err = invoice.mark_paid(5, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(invoice.payment_method_id, Some(4));
    }
}
