//! Caller identity checked by the privileged operations.
//!
//! Authentication itself lives in the host application; services only see
//! this boundary type.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Roles recognized by the ledger's privileged operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Allowed to grant review points and revert automated entries.
    SystemManager,
}

/// The authenticated caller an operation runs on behalf of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// User identifier of the caller.
    pub user: String,
    /// Roles granted to the caller by the host permission system.
    pub roles: Vec<Role>,
}

impl Session {
    /// Create a session for a user with no elevated roles.
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            roles: Vec::new(),
        }
    }

    /// Add a role to the session.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Check whether the caller holds a role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Require a role, refusing the operation otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotPermitted`] if the caller lacks the role.
    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(Error::NotPermitted(match role {
                Role::SystemManager => "System Manager role required",
            }))
        }
    }
}
