//! Append-only assignment history records.

use super::{LeadId, OrganizationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// History record of a single assignment or reassignment.
///
/// Records are only ever inserted, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAssignment {
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Lead that changed hands.
    pub lead_id: LeadId,
    /// Actor who performed the assignment.
    pub assigned_by: UserId,
    /// New assignee; `None` records an unassignment.
    pub assigned_to: Option<UserId>,
    /// Free-text context for the assignment.
    pub notes: Option<String>,
    /// When the assignment was recorded.
    pub assigned_at: DateTime<Utc>,
}
