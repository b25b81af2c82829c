//! In-memory CRM repository for service tests and local wiring.

use crate::pipeline::domain::{
    CompanyId, Contact, ContactId, ContactPatch, Intervention, Lead, LeadAssignment, LeadId,
    LeadPatch, NewContact, NewLead, OrganizationId, OutreachActivity, PocStatus, Role, User,
    UserId,
};
use crate::pipeline::ports::{CrmRepository, CrmRepositoryError, CrmRepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory CRM repository.
///
/// Every lookup is tenant-scoped; entities from other organizations behave
/// as absent, matching the port contract.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCrmRepository {
    state: Arc<RwLock<CrmState>>,
}

#[derive(Debug, Default)]
struct CrmState {
    leads: HashMap<LeadId, Lead>,
    contacts: HashMap<ContactId, Contact>,
    users: HashMap<UserId, User>,
    activities: Vec<OutreachActivity>,
    interventions: Vec<Intervention>,
    assignments: Vec<LeadAssignment>,
    next_lead_id: u64,
    next_contact_id: u64,
}

fn poisoned(err: impl std::fmt::Display) -> CrmRepositoryError {
    CrmRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryCrmRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CrmRepositoryResult<RwLockReadGuard<'_, CrmState>> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> CrmRepositoryResult<RwLockWriteGuard<'_, CrmState>> {
        self.state.write().map_err(poisoned)
    }

    /// Inserts or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the state lock is poisoned.
    pub fn seed_user(&self, user: User) -> CrmRepositoryResult<()> {
        self.write()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    /// Inserts an outreach activity record.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the state lock is poisoned.
    pub fn seed_activity(&self, activity: OutreachActivity) -> CrmRepositoryResult<()> {
        self.write()?.activities.push(activity);
        Ok(())
    }

    /// Inserts an intervention record.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the state lock is poisoned.
    pub fn seed_intervention(&self, intervention: Intervention) -> CrmRepositoryResult<()> {
        self.write()?.interventions.push(intervention);
        Ok(())
    }

    /// Returns a snapshot of the assignment history (test observability).
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the state lock is poisoned.
    pub fn assignments(&self) -> CrmRepositoryResult<Vec<LeadAssignment>> {
        Ok(self.read()?.assignments.clone())
    }
}

fn apply_contact_patch(contact: &mut Contact, patch: ContactPatch) {
    if let Some(name) = patch.name {
        contact.name = name;
    }
    if let Some(designation) = patch.designation {
        contact.designation = designation;
    }
    if let Some(linkedin_profile) = patch.linkedin_profile {
        contact.linkedin_profile = linkedin_profile;
    }
    if let Some(email) = patch.email {
        contact.email = email;
    }
    if let Some(is_primary) = patch.is_primary {
        contact.is_primary = is_primary;
    }
}

#[async_trait]
impl CrmRepository for InMemoryCrmRepository {
    async fn create_lead(&self, lead: NewLead) -> CrmRepositoryResult<Lead> {
        let mut state = self.write()?;
        state.next_lead_id += 1;
        let id = LeadId::new(state.next_lead_id);
        let universe_status = lead.universe_status;
        let stored = Lead {
            id,
            organization_id: lead.organization_id,
            company_id: lead.company_id,
            stage: lead.stage,
            universe_status,
            owner_analyst_id: lead.owner_analyst_id,
            assignees: lead.assignees,
            poc_count: 0,
            poc_status: PocStatus::Red,
            default_poc_id: None,
            backup_poc_id: None,
            pipeline_value: lead.pipeline_value,
            probability: lead.probability,
            notes: lead.notes,
            created_at: lead.created_at,
            updated_at: lead.created_at,
        };
        state.leads.insert(id, stored.clone());
        Ok(stored)
    }

    async fn lead(&self, id: LeadId, org: OrganizationId) -> CrmRepositoryResult<Option<Lead>> {
        let state = self.read()?;
        Ok(state
            .leads
            .get(&id)
            .filter(|lead| lead.organization_id == org)
            .cloned())
    }

    async fn update_lead(
        &self,
        id: LeadId,
        org: OrganizationId,
        patch: LeadPatch,
    ) -> CrmRepositoryResult<Option<Lead>> {
        let mut state = self.write()?;
        let Some(lead) = state
            .leads
            .get_mut(&id)
            .filter(|lead| lead.organization_id == org)
        else {
            return Ok(None);
        };
        patch.apply(lead);
        Ok(Some(lead.clone()))
    }

    async fn leads_by_company(
        &self,
        company: CompanyId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Lead>> {
        let state = self.read()?;
        let mut leads: Vec<Lead> = state
            .leads
            .values()
            .filter(|lead| lead.organization_id == org && lead.company_id == company)
            .cloned()
            .collect();
        leads.sort_by_key(|lead| lead.id);
        Ok(leads)
    }

    async fn leads_by_assignee(
        &self,
        user: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Lead>> {
        let state = self.read()?;
        let mut leads: Vec<Lead> = state
            .leads
            .values()
            .filter(|lead| lead.organization_id == org && lead.is_assigned_to(user))
            .cloned()
            .collect();
        leads.sort_by_key(|lead| lead.id);
        Ok(leads)
    }

    async fn leads_by_owner(
        &self,
        analyst: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Lead>> {
        let state = self.read()?;
        let mut leads: Vec<Lead> = state
            .leads
            .values()
            .filter(|lead| {
                lead.organization_id == org && lead.owner_analyst_id.as_ref() == Some(analyst)
            })
            .cloned()
            .collect();
        leads.sort_by_key(|lead| lead.id);
        Ok(leads)
    }

    async fn create_contact(&self, contact: NewContact) -> CrmRepositoryResult<Contact> {
        let mut state = self.write()?;
        state.next_contact_id += 1;
        let id = ContactId::new(state.next_contact_id);
        let stored = Contact {
            id,
            organization_id: contact.organization_id,
            company_id: contact.company_id,
            name: contact.name,
            designation: contact.designation,
            linkedin_profile: contact.linkedin_profile,
            email: contact.email,
            is_primary: contact.is_primary,
        };
        state.contacts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn contact(
        &self,
        id: ContactId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Option<Contact>> {
        let state = self.read()?;
        Ok(state
            .contacts
            .get(&id)
            .filter(|contact| contact.organization_id == org)
            .cloned())
    }

    async fn update_contact(
        &self,
        id: ContactId,
        org: OrganizationId,
        patch: ContactPatch,
    ) -> CrmRepositoryResult<Option<Contact>> {
        let mut state = self.write()?;
        let Some(contact) = state
            .contacts
            .get_mut(&id)
            .filter(|contact| contact.organization_id == org)
        else {
            return Ok(None);
        };
        apply_contact_patch(contact, patch);
        Ok(Some(contact.clone()))
    }

    async fn delete_contact(
        &self,
        id: ContactId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Option<Contact>> {
        let mut state = self.write()?;
        let belongs = state
            .contacts
            .get(&id)
            .is_some_and(|contact| contact.organization_id == org);
        if !belongs {
            return Ok(None);
        }
        Ok(state.contacts.remove(&id))
    }

    async fn contacts_by_company(
        &self,
        company: CompanyId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Contact>> {
        let state = self.read()?;
        let mut contacts: Vec<Contact> = state
            .contacts
            .values()
            .filter(|contact| contact.organization_id == org && contact.company_id == company)
            .cloned()
            .collect();
        contacts.sort_by_key(|contact| contact.id);
        Ok(contacts)
    }

    async fn outreach_activities(
        &self,
        lead: LeadId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<OutreachActivity>> {
        let state = self.read()?;
        Ok(state
            .activities
            .iter()
            .filter(|activity| activity.organization_id == org && activity.lead_id == lead)
            .cloned()
            .collect())
    }

    async fn interventions(
        &self,
        lead: LeadId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<Intervention>> {
        let state = self.read()?;
        Ok(state
            .interventions
            .iter()
            .filter(|intervention| {
                intervention.organization_id == org && intervention.lead_id == lead
            })
            .cloned()
            .collect())
    }

    async fn user(&self, id: &UserId) -> CrmRepositoryResult<Option<User>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    async fn interns_of(
        &self,
        analyst: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<Vec<User>> {
        let state = self.read()?;
        let mut interns: Vec<User> = state
            .users
            .values()
            .filter(|user| user.organization_id == org && user.reports_to_analyst(analyst))
            .cloned()
            .collect();
        interns.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(interns)
    }

    async fn set_intern_manager(
        &self,
        intern: &UserId,
        org: OrganizationId,
        analyst: &UserId,
    ) -> CrmRepositoryResult<()> {
        let mut state = self.write()?;
        let user = state
            .users
            .get_mut(intern)
            .filter(|user| user.organization_id == org)
            .ok_or_else(|| CrmRepositoryError::UserNotFound(intern.clone()))?;
        user.analyst_id = Some(analyst.clone());
        Ok(())
    }

    async fn validate_partner_of(
        &self,
        partner: &UserId,
        analyst: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<bool> {
        let state = self.read()?;
        Ok(state.users.get(analyst).is_some_and(|user| {
            user.organization_id == org
                && user.role == Role::Analyst
                && user.partner_id.as_ref() == Some(partner)
        }))
    }

    async fn validate_analyst_of(
        &self,
        analyst: &UserId,
        intern: &UserId,
        org: OrganizationId,
    ) -> CrmRepositoryResult<bool> {
        let state = self.read()?;
        Ok(state
            .users
            .get(intern)
            .is_some_and(|user| user.organization_id == org && user.reports_to_analyst(analyst)))
    }

    async fn record_assignment(&self, assignment: LeadAssignment) -> CrmRepositoryResult<()> {
        self.write()?.assignments.push(assignment);
        Ok(())
    }
}
