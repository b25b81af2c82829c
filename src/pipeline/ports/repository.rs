//! Repository port for pipeline persistence and hierarchy lookups.

use crate::pipeline::domain::{
    CompanyId, Contact, ContactId, ContactPatch, Intervention, Lead, LeadAssignment, LeadId,
    LeadPatch, NewContact, NewLead, OrganizationId, OutreachActivity, User, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for pipeline repository operations.
pub type CrmRepositoryResult<T> = Result<T, CrmRepositoryError>;

/// Persistence contract consumed by the pipeline services.
///
/// Every lookup is tenant-scoped: entities outside the given organization
/// behave as absent. The repository provides per-row update semantics only;
/// cross-request locking is explicitly not part of this contract.
#[async_trait]
pub trait CrmRepository: Send + Sync {
    /// Stores a new lead and assigns its identifier.
    async fn create_lead(&self, lead: NewLead) -> CrmRepositoryResult<Lead>;

    /// Finds a lead by identifier within an organization.
    async fn lead(&self, id: LeadId, org: OrganizationId) -> CrmRepositoryResult<Option<Lead>>;

    /// Applies a partial update to a lead.
    ///
    /// Returns the updated lead, or `None` when it does not exist.
    async fn update_lead(
        &self,
        id: LeadId,
        org: OrganizationId,
        patch: LeadPatch,
    ) -> CrmRepositoryResult<Option<Lead>>;

    /// Returns all leads tracking the given company.
    async fn leads_by_company(
        &self,
        company: CompanyId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Lead>>;

    /// Returns all leads with `user` in their assignee set.
    async fn leads_by_assignee(
        &self,
        user: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Lead>>;

    /// Returns all leads owned by the given analyst.
    async fn leads_by_owner(
        &self,
        analyst: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Lead>>;

    /// Stores a new contact and assigns its identifier.
    async fn create_contact(&self, contact: NewContact) -> CrmRepositoryResult<Contact>;

    /// Finds a contact by identifier within an organization.
    async fn contact(
        &self,
        id: ContactId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Option<Contact>>;

    /// Applies a partial update to a contact.
    async fn update_contact(
        &self,
        id: ContactId,
        org: OrganizationId,
        patch: ContactPatch,
    ) -> CrmRepositoryResult<Option<Contact>>;

    /// Removes a contact, returning it when it existed.
    async fn delete_contact(
        &self,
        id: ContactId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Option<Contact>>;

    /// Returns all contacts of the given company.
    async fn contacts_by_company(
        &self,
        company: CompanyId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Contact>>;

    /// Returns all outreach activities logged against a lead.
    async fn outreach_activities(
        &self,
        lead: LeadId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<OutreachActivity>>;

    /// Returns all interventions recorded against a lead.
    async fn interventions(
        &self,
        lead: LeadId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Intervention>>;

    /// Finds a user by identifier.
    async fn user(&self, id: &UserId) -> CrmRepositoryResult<Option<User>>;

    /// Returns the interns currently reporting to the given analyst.
    async fn interns_of(
        &self,
        analyst: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<User>>;

    /// Re-points an intern's managing analyst.
    async fn set_intern_manager(
        &self,
        intern: &UserId,
        org: OrganizationId,
        analyst: &UserId,
    ) -> CrmRepositoryResult<()>;

    /// Reports whether `partner` is the managing partner of `analyst`.
    async fn validate_partner_of(
        &self,
        partner: &UserId,
        analyst: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<bool>;

    /// Reports whether `analyst` is the managing analyst of `intern`.
    async fn validate_analyst_of(
        &self,
        analyst: &UserId,
        intern: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<bool>;

    /// Appends an assignment history record.
    async fn record_assignment(&self, assignment: LeadAssignment) -> CrmRepositoryResult<()>;
}

/// Errors returned by pipeline repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CrmRepositoryError {
    /// The lead targeted by an update does not exist.
    #[error("lead not found: {0}")]
    LeadNotFound(LeadId),

    /// The user targeted by an update does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CrmRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
