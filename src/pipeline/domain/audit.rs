//! Audit events emitted on lead mutations.

use super::{CompanyId, LeadId, OrganizationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action recorded with an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Lead created.
    LeadCreated,
    /// Lead stage changed through a validated or manual transition.
    LeadStageChanged,
    /// Lead rejected out of the pipeline.
    LeadRejected,
    /// Lead assigned or unassigned.
    LeadAssigned,
    /// Interns assigned to a lead.
    LeadAssignedIntern,
    /// Lead auto-moved to qualified after assignment to an analyst.
    LeadAutoQualifiedOnAssignment,
    /// Lead auto-advanced after its primary contact became complete.
    LeadAutoAdvanced,
    /// Book of leads transferred between analysts.
    AnalystReassigned,
    /// Leads bulk-transferred between two users.
    LeadsTransferred,
}

impl AuditAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LeadCreated => "lead_created",
            Self::LeadStageChanged => "lead_stage_changed",
            Self::LeadRejected => "lead_rejected",
            Self::LeadAssigned => "lead_assigned",
            Self::LeadAssignedIntern => "lead_assigned_intern",
            Self::LeadAutoQualifiedOnAssignment => "lead_auto_qualified_on_assignment",
            Self::LeadAutoAdvanced => "lead_auto_advanced",
            Self::AnalystReassigned => "analyst_reassigned",
            Self::LeadsTransferred => "leads_transferred",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write-only audit record handed to the audit sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Actor who triggered the event.
    pub user_id: UserId,
    /// Recorded action.
    pub action: AuditAction,
    /// Lead the event concerns, when applicable.
    pub lead_id: Option<LeadId>,
    /// Company the event concerns, when applicable.
    pub company_id: Option<CompanyId>,
    /// Prior value for change events (e.g. the old stage).
    pub old_value: Option<String>,
    /// New value for change events.
    pub new_value: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// When the event was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event with the fields shared by every action.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        user_id: UserId,
        action: AuditAction,
        description: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id,
            user_id,
            action,
            lead_id: None,
            company_id: None,
            old_value: None,
            new_value: None,
            description: description.into(),
            recorded_at,
        }
    }

    /// Attaches the lead and company the event concerns.
    #[must_use]
    pub const fn for_lead(mut self, lead_id: LeadId, company_id: CompanyId) -> Self {
        self.lead_id = Some(lead_id);
        self.company_id = Some(company_id);
        self
    }

    /// Attaches old/new change values.
    #[must_use]
    pub fn with_change(
        mut self,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        self.old_value = Some(old_value.into());
        self.new_value = Some(new_value.into());
        self
    }
}
