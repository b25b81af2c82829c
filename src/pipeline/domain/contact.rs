//! Points of contact at a company.

use super::{CompanyId, ContactId, OrganizationId};
use serde::{Deserialize, Serialize};

/// Point of contact at a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Contact identifier.
    pub id: ContactId,
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Company this contact belongs to.
    pub company_id: CompanyId,
    /// Contact name.
    pub name: String,
    /// Job title at the company.
    pub designation: String,
    /// LinkedIn profile URL.
    pub linkedin_profile: String,
    /// Optional e-mail address.
    pub email: Option<String>,
    /// Whether this contact is the company's primary point of contact.
    pub is_primary: bool,
}

impl Contact {
    /// Reports whether the qualification triple is complete.
    ///
    /// A contact is complete iff `name`, `designation`, and
    /// `linkedin_profile` are all non-empty after trimming. Completeness is
    /// always derived, never stored.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.designation.trim().is_empty()
            && !self.linkedin_profile.trim().is_empty()
    }
}

/// Fields for creating a contact; the repository assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    /// Tenant scope.
    pub organization_id: OrganizationId,
    /// Company this contact belongs to.
    pub company_id: CompanyId,
    /// Contact name.
    pub name: String,
    /// Job title at the company.
    pub designation: String,
    /// LinkedIn profile URL.
    pub linkedin_profile: String,
    /// Optional e-mail address.
    pub email: Option<String>,
    /// Whether this contact is the company's primary point of contact.
    pub is_primary: bool,
}

/// Partial update applied to a persisted contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement designation.
    pub designation: Option<String>,
    /// Replacement LinkedIn profile URL.
    pub linkedin_profile: Option<String>,
    /// Replacement e-mail; outer `None` leaves the field untouched.
    pub email: Option<Option<String>>,
    /// Replacement primary flag.
    pub is_primary: Option<bool>,
}
