//! Caller identity passed explicitly into every core operation.
//!
//! Identity resolution (tokens, sessions, passwords) lives outside this
//! crate; the pair produced there is trusted as-is.

use std::fmt;

use super::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Driver,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "DRIVER",
            Self::Staff => "STAFF",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller. For drivers `user_id` is the driver id, for
/// staff it is the staff id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub role: Role,
}

impl Caller {
    pub fn driver(id: i32) -> Self {
        Self {
            user_id: id,
            role: Role::Driver,
        }
    }

    pub fn staff(id: i32) -> Self {
        Self {
            user_id: id,
            role: Role::Staff,
        }
    }

    pub fn admin(id: i32) -> Self {
        Self {
            user_id: id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Driver id of the caller, or PermissionDenied for any other role.
    pub fn require_driver(&self) -> DomainResult<i32> {
        match self.role {
            Role::Driver => Ok(self.user_id),
            other => Err(DomainError::PermissionDenied(format!(
                "operation requires a driver, caller is {}",
                other
            ))),
        }
    }

    /// Drivers may act on their own resources; staff and admins on anyone's.
    pub fn require_driver_or_operator(&self, driver_id: i32) -> DomainResult<()> {
        match self.role {
            Role::Driver if self.user_id == driver_id => Ok(()),
            Role::Driver => Err(DomainError::PermissionDenied(format!(
                "driver {} does not own resources of driver {}",
                self.user_id, driver_id
            ))),
            Role::Staff | Role::Admin => Ok(()),
        }
    }

    pub fn require_operator(&self) -> DomainResult<()> {
        match self.role {
            Role::Staff | Role::Admin => Ok(()),
            Role::Driver => Err(DomainError::PermissionDenied(
                "operation requires staff or admin".to_string(),
            )),
        }
    }

    pub fn require_admin(&self) -> DomainResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::PermissionDenied(format!(
                "operation requires admin, caller is {}",
                self.role
            )))
        }
    }
}
