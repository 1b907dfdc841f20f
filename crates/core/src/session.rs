//! Caller identity passed into state-changing operations.

use crate::id::UserId;
use serde::{Deserialize, Serialize};

/// Role of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Consumes content and submits work
    Student,
    /// Manages content and grades work
    Admin,
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Who is calling
    pub user_id: UserId,

    /// In what capacity
    pub role: Role,
}

impl Session {
    /// Student session.
    pub fn student(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Student,
        }
    }

    /// Admin session.
    pub fn admin(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    /// Whether the caller may grade and moderate.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with `PermissionDenied` unless the caller is an admin.
    pub fn require_admin(&self, action: &str) -> crate::Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(crate::Error::PermissionDenied(format!(
                "{action} requires an admin session (caller {})",
                self.user_id
            )))
        }
    }
}
