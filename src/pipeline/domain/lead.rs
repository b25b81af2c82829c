//! Lead aggregate: a company's candidacy moving through the pipeline.

use super::{CompanyId, Contact, ContactId, LeadId, OrganizationId, Stage, UniverseStatus, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Traffic-light summary of a lead's point-of-contact completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PocStatus {
    /// No contacts, or none complete.
    Red,
    /// At least one complete contact, fewer than three in total.
    Amber,
    /// Three or more contacts with at least one complete.
    Green,
}

impl PocStatus {
    /// Computes the summary from a company's contacts.
    #[must_use]
    pub fn compute(contacts: &[Contact]) -> Self {
        if contacts.is_empty() || !contacts.iter().any(Contact::is_complete) {
            return Self::Red;
        }
        if contacts.len() >= 3 {
            Self::Green
        } else {
            Self::Amber
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Amber => "amber",
            Self::Green => "green",
        }
    }
}

impl fmt::Display for PocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A company's candidacy moving through the deal pipeline.
///
/// Assignment is modelled as one canonical set-valued relation
/// ([`Lead::assignees`]); the legacy single-assignee view is exposed only as
/// the derived [`Lead::primary_assignee`] accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Lead identifier.
    pub id: LeadId,
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Company whose candidacy this lead tracks.
    pub company_id: CompanyId,
    /// Position in the pipeline.
    pub stage: Stage,
    /// Claim sub-state, meaningful only while `stage` is universe.
    pub universe_status: UniverseStatus,
    /// Analyst accountable for this lead; constrains intern assignment.
    pub owner_analyst_id: Option<UserId>,
    /// Users currently assigned to work this lead.
    pub assignees: BTreeSet<UserId>,
    /// Denormalized count of the company's contacts.
    pub poc_count: u32,
    /// Denormalized contact-completeness summary.
    pub poc_status: PocStatus,
    /// Primary point of contact selected when entering pitching.
    pub default_poc_id: Option<ContactId>,
    /// Backup point of contact, distinct from the default.
    pub backup_poc_id: Option<ContactId>,
    /// Expected deal value.
    pub pipeline_value: Option<Decimal>,
    /// Probability of closing.
    pub probability: Decimal,
    /// Free-text notes; carries outcome and rejection reasons.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Returns the derived single assignee (first member in id order).
    #[must_use]
    pub fn primary_assignee(&self) -> Option<&UserId> {
        self.assignees.first()
    }

    /// Reports whether any assignee is set.
    #[must_use]
    pub fn has_assignee(&self) -> bool {
        !self.assignees.is_empty()
    }

    /// Reports whether `user` is currently assigned to this lead.
    #[must_use]
    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assignees.contains(user)
    }

    /// Reports whether the notes carry non-whitespace content.
    #[must_use]
    pub fn has_notes(&self) -> bool {
        self.notes
            .as_deref()
            .is_some_and(|notes| !notes.trim().is_empty())
    }
}

/// Fields for creating a lead; the repository assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Company whose candidacy this lead tracks.
    pub company_id: CompanyId,
    /// Initial stage, derived from the creator's role.
    pub stage: Stage,
    /// Initial claim sub-state.
    pub universe_status: UniverseStatus,
    /// Owning analyst, derived from the creator's role.
    pub owner_analyst_id: Option<UserId>,
    /// Initial assignees.
    pub assignees: BTreeSet<UserId>,
    /// Expected deal value.
    pub pipeline_value: Option<Decimal>,
    /// Probability of closing.
    pub probability: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Partial update applied to a persisted lead.
///
/// `None` leaves a field untouched; nullable fields use a double `Option`
/// where `Some(None)` clears the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadPatch {
    /// Mutation timestamp recorded as the lead's `updated_at`.
    pub updated_at: DateTime<Utc>,
    /// Replacement stage.
    pub stage: Option<Stage>,
    /// Replacement claim sub-state.
    pub universe_status: Option<UniverseStatus>,
    /// Replacement owner; `Some(None)` clears ownership.
    pub owner_analyst_id: Option<Option<UserId>>,
    /// Replacement assignee set.
    pub assignees: Option<BTreeSet<UserId>>,
    /// Replacement contact count.
    pub poc_count: Option<u32>,
    /// Replacement contact-completeness summary.
    pub poc_status: Option<PocStatus>,
    /// Replacement default point of contact.
    pub default_poc_id: Option<Option<ContactId>>,
    /// Replacement backup point of contact.
    pub backup_poc_id: Option<Option<ContactId>>,
    /// Replacement notes.
    pub notes: Option<Option<String>>,
}

impl LeadPatch {
    /// Creates an empty patch stamped with the mutation time.
    #[must_use]
    pub const fn at(updated_at: DateTime<Utc>) -> Self {
        Self {
            updated_at,
            stage: None,
            universe_status: None,
            owner_analyst_id: None,
            assignees: None,
            poc_count: None,
            poc_status: None,
            default_poc_id: None,
            backup_poc_id: None,
            notes: None,
        }
    }

    /// Applies the patch to a lead in place.
    pub fn apply(self, lead: &mut Lead) {
        lead.updated_at = self.updated_at;
        if let Some(stage) = self.stage {
            lead.stage = stage;
        }
        if let Some(universe_status) = self.universe_status {
            lead.universe_status = universe_status;
        }
        if let Some(owner) = self.owner_analyst_id {
            lead.owner_analyst_id = owner;
        }
        if let Some(assignees) = self.assignees {
            lead.assignees = assignees;
        }
        if let Some(poc_count) = self.poc_count {
            lead.poc_count = poc_count;
        }
        if let Some(poc_status) = self.poc_status {
            lead.poc_status = poc_status;
        }
        if let Some(default_poc) = self.default_poc_id {
            lead.default_poc_id = default_poc;
        }
        if let Some(backup_poc) = self.backup_poc_id {
            lead.backup_poc_id = backup_poc;
        }
        if let Some(notes) = self.notes {
            lead.notes = notes;
        }
    }
}
