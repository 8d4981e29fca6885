//! Driver wallet and ledger entries

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::shared::errors::DomainError;

/// Tolerance used when comparing a replayed balance with the stored one.
pub const BALANCE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Driver {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub wallet_balance: f64,
    pub created_at: DateTime<Utc>,
}

/// Audit triple returned by every balance change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalletAdjustment {
    pub balance_before: f64,
    pub delta: f64,
    pub balance_after: f64,
}

impl WalletAdjustment {
    pub fn new(balance_before: f64, delta: f64) -> Self {
        Self {
            balance_before,
            delta,
            balance_after: balance_before + delta,
        }
    }

    pub fn is_overdrawn(&self) -> bool {
        self.balance_after < 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEntryKind {
    TopUp,
    SessionDebit,
    Adjustment,
}

impl LedgerEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopUp => "TOP_UP",
            Self::SessionDebit => "SESSION_DEBIT",
            Self::Adjustment => "ADJUSTMENT",
        }
    }
}

impl fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerEntryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOP_UP" => Ok(Self::TopUp),
            "SESSION_DEBIT" => Ok(Self::SessionDebit),
            "ADJUSTMENT" => Ok(Self::Adjustment),
            other => Err(DomainError::Storage(format!(
                "unknown ledger entry kind '{}'",
                other
            ))),
        }
    }
}

/// Immutable record of one balance change.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub id: i32,
    pub driver_id: i32,
    pub kind: LedgerEntryKind,
    pub delta: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    /// Unique per effect (e.g. `session:12`), guards against double application
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn session_reference(session_id: i32) -> String {
        format!("session:{}", session_id)
    }

    pub fn top_up_reference(confirmation: &str) -> String {
        format!("topup:{}", confirmation)
    }
}

/// Result of replaying a driver's ledger against the stored balance.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerAudit {
    pub driver_id: i32,
    pub stored_balance: f64,
    pub replayed_balance: f64,
    pub entries: usize,
    /// First entry whose `balance_before` does not continue the chain
    pub broken_at: Option<i32>,
}

impl LedgerAudit {
    /// Reduce entries (oldest first) from a zero opening balance.
    pub fn replay(driver_id: i32, stored_balance: f64, entries: &[LedgerEntry]) -> Self {
        let mut running = 0.0;
        let mut broken_at = None;

        for entry in entries {
            if broken_at.is_none() && (entry.balance_before - running).abs() > BALANCE_EPSILON {
                broken_at = Some(entry.id);
            }
            running += entry.delta;
        }

        Self {
            driver_id,
            stored_balance,
            replayed_balance: running,
            entries: entries.len(),
            broken_at,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.broken_at.is_none()
            && (self.stored_balance - self.replayed_balance).abs() <= BALANCE_EPSILON
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i32, before: f64, delta: f64) -> LedgerEntry {
        LedgerEntry {
            id,
            driver_id: 1,
            kind: if delta >= 0.0 {
                LedgerEntryKind::TopUp
            } else {
                LedgerEntryKind::SessionDebit
            },
            delta,
            balance_before: before,
            balance_after: before + delta,
            reference: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn adjustment_triple() {
        let adj = WalletAdjustment::new(20.0, -7.5);
        assert_eq!(adj.balance_after, 12.5);
        assert!(!adj.is_overdrawn());
        assert!(WalletAdjustment::new(5.0, -10.0).is_overdrawn());
    }

    #[test]
    fn replay_matches_stored_balance() {
        let entries = vec![entry(1, 0.0, 50.0), entry(2, 50.0, -10.0), entry(3, 40.0, -45.0)];
        let audit = LedgerAudit::replay(1, -5.0, &entries);
        assert_eq!(audit.replayed_balance, -5.0);
        assert_eq!(audit.entries, 3);
        assert!(audit.is_consistent());
    }

    #[test]
    fn replay_detects_drift() {
        let entries = vec![entry(1, 0.0, 50.0)];
        let audit = LedgerAudit::replay(1, 60.0, &entries);
        assert!(!audit.is_consistent());
    }

    #[test]
    fn replay_detects_broken_chain() {
        let entries = vec![entry(1, 0.0, 50.0), entry(2, 70.0, -10.0)];
        let audit = LedgerAudit::replay(1, 40.0, &entries);
        assert_eq!(audit.broken_at, Some(2));
        assert!(!audit.is_consistent());
    }

    #[test]
    fn references_are_namespaced() {
        assert_eq!(LedgerEntry::session_reference(12), "session:12");
        assert_eq!(LedgerEntry::top_up_reference("abc"), "topup:abc");
    }
}
