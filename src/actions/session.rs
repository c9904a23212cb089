use crate::core::{CondoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Resident,
    Professional,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Manager => "manager",
            Self::Resident => "resident",
            Self::Professional => "professional",
        };
        write!(f, "{label}")
    }
}

/// Who is looking at the dashboard and which building (tenant) is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
    pub building_id: Uuid,
}

impl Session {
    pub fn new(user_id: Uuid, role: Role, building_id: Uuid) -> Self {
        Self {
            user_id,
            role,
            building_id,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    pub fn require_role(&self, allowed: &[Role], action: &str) -> Result<()> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        Err(CondoError::forbidden(format!(
            "role '{}' may not {action}",
            self.role
        )))
    }
}
