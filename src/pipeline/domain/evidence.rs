//! Evidence records gating stage transitions.
//!
//! Interventions are recorded outreach touchpoints or document-collection
//! events; outreach activities are logged contact attempts. Several stage
//! gates check for their presence rather than trusting the caller.

use super::{ActivityId, InterventionId, LeadId, OrganizationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document name required to enter the mandates stage.
pub const LETTER_OF_ENGAGEMENT_DOCUMENT: &str = "Letter of Engagement";

/// Document name required to move from mandates to won.
pub const CONTRACT_DOCUMENT: &str = "Contract";

/// Kind of recorded outreach touchpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    /// Direct message on LinkedIn.
    LinkedinMessage,
    /// Phone call.
    Call,
    /// WhatsApp message.
    Whatsapp,
    /// E-mail.
    Email,
    /// Meeting with points of contact.
    Meeting,
    /// Document collected from the company.
    Document,
}

impl InterventionKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LinkedinMessage => "linkedin_message",
            Self::Call => "call",
            Self::Whatsapp => "whatsapp",
            Self::Email => "email",
            Self::Meeting => "meeting",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for InterventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded outreach touchpoint or document-collection event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    /// Intervention identifier.
    pub id: InterventionId,
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Lead the intervention was recorded against.
    pub lead_id: LeadId,
    /// Touchpoint kind.
    pub kind: InterventionKind,
    /// When the touchpoint happened or is scheduled.
    pub scheduled_at: DateTime<Utc>,
    /// Collected document name, set for [`InterventionKind::Document`].
    pub document_name: Option<String>,
}

impl Intervention {
    /// Reports whether this intervention is the named collected document.
    #[must_use]
    pub fn is_document(&self, name: &str) -> bool {
        self.kind == InterventionKind::Document && self.document_name.as_deref() == Some(name)
    }
}

/// Status of a logged contact attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Attempt logged, not yet made.
    Pending,
    /// Attempt made and finished.
    Completed,
    /// Attempt scheduled for a future date.
    Scheduled,
    /// Outbound message sent.
    Sent,
    /// Reply received.
    Received,
    /// Follow-up required.
    FollowUp,
    /// Contact data turned out to be invalid.
    Invalid,
}

impl ActivityStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Scheduled => "scheduled",
            Self::Sent => "sent",
            Self::Received => "received",
            Self::FollowUp => "follow_up",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logged contact attempt against a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachActivity {
    /// Activity identifier.
    pub id: ActivityId,
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Lead the attempt was logged against.
    pub lead_id: LeadId,
    /// Attempt status.
    pub status: ActivityStatus,
    /// Free-text description of the attempt.
    pub description: Option<String>,
    /// When the attempt was logged.
    pub logged_at: DateTime<Utc>,
}
