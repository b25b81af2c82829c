//! Domain types for challenge tokens.

use crate::pipeline::domain::{LeadId, OrganizationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation a challenge token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Moving a lead away from an existing assignee.
    Reassignment,
}

impl TokenPurpose {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reassignment => "reassignment",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuple a token is bound to; every field must match on validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenBinding {
    /// User the token was issued to.
    pub user_id: UserId,
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Lead the authorized operation targets.
    pub lead_id: LeadId,
    /// Operation the token authorizes.
    pub purpose: TokenPurpose,
}

/// Issued token with its binding and lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeTokenRecord {
    /// Opaque token material handed to the caller.
    pub token: String,
    /// Tuple the token is bound to.
    pub binding: TokenBinding,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry deadline; the token is unusable afterwards.
    pub expires_at: DateTime<Utc>,
}

impl ChallengeTokenRecord {
    /// Reports whether the token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Key scoping a rate-limit window to one user in one organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateKey {
    /// User being limited.
    pub user_id: UserId,
    /// Tenant scope.
    pub organization_id: OrganizationId,
}
