//! Payment method domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentType {
    Card,
    EWallet,
    BankTransfer,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "CARD",
            Self::EWallet => "E_WALLET",
            Self::BankTransfer => "BANK_TRANSFER",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(Self::Card),
            "E_WALLET" => Ok(Self::EWallet),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            other => Err(DomainError::Storage(format!(
                "unknown payment type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentMethod {
    pub id: i32,
    pub driver_id: i32,
    pub payment_type: PaymentType,
    pub provider: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl PaymentMethod {
    pub fn ensure_owned_by(&self, driver_id: i32) -> DomainResult<()> {
        if self.driver_id != driver_id {
            return Err(DomainError::PermissionDenied(format!(
                "payment method {} does not belong to driver {}",
                self.id, driver_id
            )));
        }
        Ok(())
    }
}
