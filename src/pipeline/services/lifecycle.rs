//! Lead lifecycle orchestration: creation, contact upkeep, assignment.
//!
//! Every operation follows the same ordering: validate, persist the primary
//! mutation, then run best-effort side effects. Side-effect failures are
//! logged and swallowed so they can never roll back or mask the primary
//! mutation.

use crate::challenge::domain::TokenPurpose;
use crate::challenge::ports::TokenStore;
use crate::challenge::services::{ChallengeTokenAuthority, RateLimitError};
use crate::pipeline::domain::{
    AuditAction, AuditEvent, CompanyId, Contact, ContactId, ContactPatch, Lead, LeadAssignment,
    LeadId, LeadPatch, NewContact, NewLead, OrganizationId, PocStatus, Role, Stage, UniverseStatus,
    User, UserId,
};
use crate::pipeline::ports::{AuditSink, CrmRepository, CrmRepositoryError, CrmRepositoryResult};
use mockable::Clock;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Stage a universe lead is advanced to when its primary contact completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoAdvancePolicy {
    /// Advance to qualified only.
    #[default]
    Qualified,
    /// Advance through qualified on to outreach when an assignee is set.
    Outreach,
}

/// Fields for creating a lead through the orchestrator.
///
/// Stage, ownership, and assignment are derived from the caller's role and
/// are deliberately absent here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLeadRequest {
    /// Company whose candidacy the lead tracks.
    pub company_id: CompanyId,
    /// Expected deal value.
    pub pipeline_value: Option<Decimal>,
    /// Probability of closing.
    pub probability: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Result of an assignment, including what the best-effort tail achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignLeadOutcome {
    /// The lead after the assignment and any best-effort advancement.
    pub lead: Lead,
    /// Whether the post-assignment auto-progression moved the lead.
    pub auto_progressed: bool,
    /// The stage auto-progression reached, when it moved the lead.
    pub new_stage: Option<Stage>,
}

/// Errors raised by lead lifecycle operations.
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    /// The lead does not exist in the caller's organization.
    #[error("lead not found: {0}")]
    LeadNotFound(LeadId),

    /// The referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The referenced user belongs to another organization.
    #[error("user {0} is not in your organization")]
    OutsideOrganization(UserId),

    /// The referenced contact does not exist in the caller's organization.
    #[error("contact not found: {0}")]
    ContactNotFound(ContactId),

    /// Reassigning an already-assigned lead requires a challenge token.
    #[error("reassignment requires a challenge token")]
    TokenRequired,

    /// The supplied challenge token was absent, expired, or mismatched.
    #[error("challenge token rejected")]
    TokenRejected,

    /// Token issuance exceeded the per-user quota.
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] CrmRepositoryError),
}

/// Result type for lead lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Orchestrates lead creation, contact upkeep, and lead assignment.
#[derive(Clone)]
pub struct LeadLifecycleService<R, A, S, C>
where
    R: CrmRepository,
    A: AuditSink,
    S: TokenStore,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    audit: Arc<A>,
    tokens: ChallengeTokenAuthority<S, C>,
    progression: super::StageProgressionService<R, A, C>,
    clock: Arc<C>,
    auto_advance: AutoAdvancePolicy,
}

impl<R, A, S, C> LeadLifecycleService<R, A, S, C>
where
    R: CrmRepository,
    A: AuditSink,
    S: TokenStore,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service with the default auto-advance policy.
    #[must_use]
    pub fn new(repository: Arc<R>, audit: Arc<A>, store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            tokens: ChallengeTokenAuthority::new(store, Arc::clone(&clock)),
            progression: super::StageProgressionService::new(
                Arc::clone(&repository),
                Arc::clone(&audit),
                Arc::clone(&clock),
            ),
            repository,
            audit,
            clock,
            auto_advance: AutoAdvancePolicy::default(),
        }
    }

    /// Replaces the auto-advance policy applied on contact completion.
    #[must_use]
    pub const fn with_auto_advance(mut self, policy: AutoAdvancePolicy) -> Self {
        self.auto_advance = policy;
        self
    }

    async fn require_user(&self, id: &UserId, org: OrganizationId) -> LifecycleResult<User> {
        let user = self
            .repository
            .user(id)
            .await?
            .ok_or_else(|| LifecycleError::UserNotFound(id.clone()))?;
        if user.organization_id != org {
            return Err(LifecycleError::OutsideOrganization(id.clone()));
        }
        Ok(user)
    }

    async fn require_lead(&self, id: LeadId, org: OrganizationId) -> LifecycleResult<Lead> {
        self.repository
            .lead(id, org)
            .await?
            .ok_or(LifecycleError::LeadNotFound(id))
    }

    /// Creates a lead with stage and ownership derived from the caller's role.
    ///
    /// An analyst creator becomes the owner and sole assignee and the lead
    /// starts in qualified; any other role yields an unowned, unassigned
    /// universe lead.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UserNotFound`],
    /// [`LifecycleError::OutsideOrganization`], or a repository error.
    pub async fn create_lead(
        &self,
        actor_id: &UserId,
        org: OrganizationId,
        request: CreateLeadRequest,
    ) -> LifecycleResult<Lead> {
        let actor = self.require_user(actor_id, org).await?;
        let now = self.clock.utc();

        let (stage, owner, assignees) = match actor.role {
            Role::Analyst => {
                let mut assignees = BTreeSet::new();
                assignees.insert(actor_id.clone());
                (Stage::Qualified, Some(actor_id.clone()), assignees)
            }
            Role::Admin | Role::Partner | Role::Intern => (Stage::Universe, None, BTreeSet::new()),
        };
        let universe_status = UniverseStatus::from_assigned(!assignees.is_empty());

        let lead = self
            .repository
            .create_lead(NewLead {
                organization_id: org,
                company_id: request.company_id,
                stage,
                universe_status,
                owner_analyst_id: owner,
                assignees,
                pipeline_value: request.pipeline_value,
                probability: request.probability,
                notes: request.notes,
                created_at: now,
            })
            .await?;

        self.audit
            .record(
                AuditEvent::new(
                    org,
                    actor_id.clone(),
                    AuditAction::LeadCreated,
                    format!("Lead created in {} stage", lead.stage),
                    now,
                )
                .for_lead(lead.id, lead.company_id),
            )
            .await;
        Ok(lead)
    }

    /// Creates a contact and refreshes the company's POC summaries.
    ///
    /// The refresh and any resulting auto-advancement are best effort:
    /// failures are logged and the created contact is still returned.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the creation itself fails.
    pub async fn create_contact(
        &self,
        actor_id: &UserId,
        contact: NewContact,
    ) -> LifecycleResult<Contact> {
        let created = self.repository.create_contact(contact).await?;
        self.refresh_company_pocs(created.company_id, created.organization_id, actor_id, true)
            .await;
        Ok(created)
    }

    /// Updates a contact and refreshes the company's POC summaries.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ContactNotFound`] or a repository error.
    pub async fn update_contact(
        &self,
        actor_id: &UserId,
        contact_id: ContactId,
        org: OrganizationId,
        patch: ContactPatch,
    ) -> LifecycleResult<Contact> {
        let updated = self
            .repository
            .update_contact(contact_id, org, patch)
            .await?
            .ok_or(LifecycleError::ContactNotFound(contact_id))?;
        self.refresh_company_pocs(updated.company_id, org, actor_id, true)
            .await;
        Ok(updated)
    }

    /// Deletes a contact and refreshes the company's POC summaries.
    ///
    /// Deletion never auto-advances a lead.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ContactNotFound`] or a repository error.
    pub async fn delete_contact(
        &self,
        actor_id: &UserId,
        contact_id: ContactId,
        org: OrganizationId,
    ) -> LifecycleResult<Contact> {
        let deleted = self
            .repository
            .delete_contact(contact_id, org)
            .await?
            .ok_or(LifecycleError::ContactNotFound(contact_id))?;
        self.refresh_company_pocs(deleted.company_id, org, actor_id, false)
            .await;
        Ok(deleted)
    }

    /// Issues a challenge token authorizing one reassignment of `lead_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::RateLimited`] when the caller exceeds the
    /// issuance quota, [`LifecycleError::LeadNotFound`], or a repository
    /// error.
    pub async fn issue_reassignment_token(
        &self,
        actor_id: &UserId,
        org: OrganizationId,
        lead_id: LeadId,
    ) -> LifecycleResult<String> {
        self.require_lead(lead_id, org).await?;
        let token = self
            .tokens
            .create_token(actor_id.clone(), org, lead_id, TokenPurpose::Reassignment)
            .await?;
        Ok(token)
    }

    /// Assigns a lead to one user, or unassigns it entirely.
    ///
    /// Changing an existing assignment, including clearing it, demands a
    /// valid challenge token bound to the acting user and lead. Repeating
    /// the current assignment does not. Ownership follows an analyst
    /// assignee. After the persisted replacement, best-effort steps run in
    /// order: auto-qualify a universe lead assigned to an analyst, record
    /// the assignment audit event, then attempt generic auto-progression.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TokenRequired`] or
    /// [`LifecycleError::TokenRejected`] for reassignment without a valid
    /// token, [`LifecycleError::UserNotFound`] /
    /// [`LifecycleError::OutsideOrganization`] for a bad assignee,
    /// [`LifecycleError::LeadNotFound`], or a repository error.
    pub async fn assign_lead(
        &self,
        lead_id: LeadId,
        org: OrganizationId,
        assigned_by: &UserId,
        assignee: Option<UserId>,
        notes: Option<String>,
        token: Option<&str>,
    ) -> LifecycleResult<AssignLeadOutcome> {
        let lead = self.require_lead(lead_id, org).await?;
        let is_reassignment = lead.has_assignee()
            && assignee
                .as_ref()
                .is_none_or(|candidate| !lead.is_assigned_to(candidate));
        if is_reassignment {
            let Some(token) = token else {
                return Err(LifecycleError::TokenRequired);
            };
            let accepted = self
                .tokens
                .validate_token(
                    token,
                    assigned_by.clone(),
                    org,
                    lead_id,
                    TokenPurpose::Reassignment,
                )
                .await;
            if !accepted {
                return Err(LifecycleError::TokenRejected);
            }
        }

        let assignee_user = match &assignee {
            Some(id) => Some(self.require_user(id, org).await?),
            None => None,
        };

        let now = self.clock.utc();
        let assignees: BTreeSet<UserId> = assignee.iter().cloned().collect();
        let mut patch = LeadPatch::at(now);
        if lead.stage == Stage::Universe {
            patch.universe_status = Some(UniverseStatus::from_assigned(!assignees.is_empty()));
        }
        if let Some(user) = &assignee_user {
            if user.role == Role::Analyst {
                patch.owner_analyst_id = Some(Some(user.id.clone()));
            }
        }
        patch.assignees = Some(assignees);
        let mut updated = self
            .repository
            .update_lead(lead_id, org, patch)
            .await?
            .ok_or(LifecycleError::LeadNotFound(lead_id))?;

        self.repository
            .record_assignment(LeadAssignment {
                organization_id: org,
                lead_id,
                assigned_by: assigned_by.clone(),
                assigned_to: assignee.clone(),
                notes,
                assigned_at: now,
            })
            .await?;

        // Best-effort tail; the assignment above is already committed.
        if updated.stage == Stage::Universe
            && assignee_user
                .as_ref()
                .is_some_and(|user| user.role == Role::Analyst)
        {
            match self.auto_qualify(&updated, assigned_by, now).await {
                Ok(lead) => updated = lead,
                Err(err) => warn!(%lead_id, error = %err, "auto-qualify after assignment failed"),
            }
        }

        let description = match &assignee {
            Some(id) => format!("Lead assigned to {id}"),
            None => "Lead unassigned".to_owned(),
        };
        self.audit
            .record(
                AuditEvent::new(
                    org,
                    assigned_by.clone(),
                    AuditAction::LeadAssigned,
                    description,
                    now,
                )
                .for_lead(lead_id, updated.company_id),
            )
            .await;

        let mut auto_progressed = false;
        let mut new_stage = None;
        match self.progression.auto_progress(lead_id, org).await {
            Ok(outcome) if outcome.progressed => {
                auto_progressed = true;
                new_stage = outcome.new_stage;
                if let Some(lead) = self.repository.lead(lead_id, org).await? {
                    updated = lead;
                }
            }
            Ok(_) => {}
            Err(err) => warn!(%lead_id, error = %err, "auto-progression after assignment failed"),
        }

        Ok(AssignLeadOutcome {
            lead: updated,
            auto_progressed,
            new_stage,
        })
    }

    async fn auto_qualify(
        &self,
        lead: &Lead,
        actor: &UserId,
        now: chrono::DateTime<chrono::Utc>,
    ) -> CrmRepositoryResult<Lead> {
        let mut patch = LeadPatch::at(now);
        patch.stage = Some(Stage::Qualified);
        let updated = self
            .repository
            .update_lead(lead.id, lead.organization_id, patch)
            .await?
            .ok_or(CrmRepositoryError::LeadNotFound(lead.id))?;
        self.audit
            .record(
                AuditEvent::new(
                    lead.organization_id,
                    actor.clone(),
                    AuditAction::LeadAutoQualifiedOnAssignment,
                    "Lead auto-qualified on assignment to analyst".to_owned(),
                    now,
                )
                .for_lead(lead.id, lead.company_id)
                .with_change(Stage::Universe.as_str(), Stage::Qualified.as_str()),
            )
            .await;
        Ok(updated)
    }

    /// Recomputes POC summaries for every lead of a company.
    ///
    /// Failures are logged and swallowed; contact mutations must survive a
    /// broken summary refresh.
    async fn refresh_company_pocs(
        &self,
        company: CompanyId,
        org: OrganizationId,
        actor: &UserId,
        allow_auto_advance: bool,
    ) {
        if let Err(err) = self
            .try_refresh_company_pocs(company, org, actor, allow_auto_advance)
            .await
        {
            warn!(%company, error = %err, "POC summary refresh failed");
        }
    }

    async fn try_refresh_company_pocs(
        &self,
        company: CompanyId,
        org: OrganizationId,
        actor: &UserId,
        allow_auto_advance: bool,
    ) -> CrmRepositoryResult<()> {
        let contacts = self.repository.contacts_by_company(company, org).await?;
        let poc_count = u32::try_from(contacts.len()).unwrap_or(u32::MAX);
        let poc_status = PocStatus::compute(&contacts);
        let primary_complete = contacts
            .iter()
            .find(|contact| contact.is_primary)
            .or_else(|| contacts.first())
            .is_some_and(Contact::is_complete);

        let now = self.clock.utc();
        let leads = self.repository.leads_by_company(company, org).await?;
        for lead in leads {
            let mut patch = LeadPatch::at(now);
            patch.poc_count = Some(poc_count);
            patch.poc_status = Some(poc_status);
            self.repository.update_lead(lead.id, org, patch).await?;

            if allow_auto_advance && lead.stage == Stage::Universe && primary_complete {
                self.advance_on_contact_completion(&lead, actor, now).await?;
            }
        }
        Ok(())
    }

    /// Advances a universe lead whose primary contact just completed.
    ///
    /// The outreach policy steps through qualified so every persisted
    /// transition follows a stage-graph edge, and only continues to outreach
    /// when the lead already has an assignee.
    async fn advance_on_contact_completion(
        &self,
        lead: &Lead,
        actor: &UserId,
        now: chrono::DateTime<chrono::Utc>,
    ) -> CrmRepositoryResult<()> {
        let mut patch = LeadPatch::at(now);
        patch.stage = Some(Stage::Qualified);
        self.repository
            .update_lead(lead.id, lead.organization_id, patch)
            .await?;
        let mut reached = Stage::Qualified;

        if self.auto_advance == AutoAdvancePolicy::Outreach && lead.has_assignee() {
            let mut outreach_patch = LeadPatch::at(now);
            outreach_patch.stage = Some(Stage::Outreach);
            self.repository
                .update_lead(lead.id, lead.organization_id, outreach_patch)
                .await?;
            reached = Stage::Outreach;
        }

        self.audit
            .record(
                AuditEvent::new(
                    lead.organization_id,
                    actor.clone(),
                    AuditAction::LeadAutoAdvanced,
                    format!("Lead auto-advanced to {reached} on contact completion"),
                    now,
                )
                .for_lead(lead.id, lead.company_id)
                .with_change(Stage::Universe.as_str(), reached.as_str()),
            )
            .await;
        Ok(())
    }
}
