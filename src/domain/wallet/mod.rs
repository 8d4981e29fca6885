//! Wallet aggregate
//!
//! Driver balance plus the append-only ledger that explains it.

pub mod model;

pub use model::{Driver, LedgerAudit, LedgerEntry, LedgerEntryKind, WalletAdjustment};
