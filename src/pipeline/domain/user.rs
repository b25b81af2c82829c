//! Users and the Partner → Analyst → Intern authority hierarchy.

use super::{OrganizationId, ParseRoleError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an actor within an organization.
///
/// Roles form a closed set; assignment rules dispatch on them exhaustively
/// so adding a role forces every call site to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Organization administrator; bypasses hierarchy checks.
    Admin,
    /// Supervises analysts.
    Partner,
    /// Owns leads; supervises interns.
    Analyst,
    /// Works leads assigned by an analyst.
    Intern,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Partner => "partner",
            Self::Analyst => "analyst",
            Self::Intern => "intern",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "admin" => Ok(Self::Admin),
            "partner" => Ok(Self::Partner),
            "analyst" => Ok(Self::Analyst),
            "intern" => Ok(Self::Intern),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actor within an organization, carrying its place in the authority graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity-provider subject.
    pub id: UserId,
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Closed role.
    pub role: Role,
    /// Display name used in audit descriptions.
    pub name: String,
    /// Managing partner, set for analysts.
    pub partner_id: Option<UserId>,
    /// Managing analyst, set for interns.
    pub analyst_id: Option<UserId>,
}

impl User {
    /// Reports whether this user is an intern reporting to `analyst`.
    #[must_use]
    pub fn reports_to_analyst(&self, analyst: &UserId) -> bool {
        self.role == Role::Intern && self.analyst_id.as_ref() == Some(analyst)
    }
}
