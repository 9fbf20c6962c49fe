//! Role hierarchy and capability checks.
//!
//! Roles are resolved by the session layer; this module only answers
//! whether a resolved role may perform a given administrative action.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User roles, highest privilege first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Top-level administrator across all zones.
    SuperAdmin,
    /// Administrator of a single zone.
    ZoneAdmin,
    /// Administrator of a group of churches within a zone.
    GroupAdmin,
    /// Member of a single church.
    ChurchUser,
}

impl UserRole {
    /// Returns true if this role can advance, select, preview or reset financial years.
    #[must_use]
    pub const fn can_manage_financial_years(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::ZoneAdmin)
    }

    /// Returns true if this role can roll back an import batch.
    #[must_use]
    pub const fn can_rollback_uploads(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::ZoneAdmin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::ZoneAdmin => write!(f, "zone_admin"),
            Self::GroupAdmin => write!(f, "group_admin"),
            Self::ChurchUser => write!(f, "church_user"),
        }
    }
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "super_admin" => Ok(Self::SuperAdmin),
            "zone_admin" => Ok(Self::ZoneAdmin),
            "group_admin" => Ok(Self::GroupAdmin),
            "church_user" => Ok(Self::ChurchUser),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
