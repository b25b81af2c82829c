//! Assignment and ownership authority.
//!
//! Resolves who may assign or reassign a lead to whom, given the
//! Partner → Analyst → Intern hierarchy and lead ownership. Every rule
//! violation surfaces a specific, human-readable reason; none are retried.

use crate::pipeline::domain::{
    AuditAction, AuditEvent, Lead, LeadAssignment, LeadId, LeadPatch, OrganizationId, Role, Stage,
    UniverseStatus, User, UserId,
};
use crate::pipeline::ports::{AuditSink, CrmRepository, CrmRepositoryError};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Counts returned by an analyst-to-analyst book transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReassignmentSummary {
    /// Leads whose ownership moved.
    pub leads_transferred: usize,
    /// Interns whose managing analyst moved.
    pub interns_transferred: usize,
}

/// Counts returned by a bulk lead transfer between two users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSummary {
    /// Leads reassigned to the target user.
    pub leads_transferred: usize,
}

/// Errors raised by assignment authority operations.
#[derive(Debug, Clone, Error)]
pub enum AssignmentError {
    /// The lead does not exist in the caller's organization.
    #[error("lead not found: {0}")]
    LeadNotFound(LeadId),

    /// The referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The referenced user belongs to another organization.
    #[error("user {0} is not in your organization")]
    OutsideOrganization(UserId),

    /// The referenced user does not hold the intern role.
    #[error("user {0} is not an intern")]
    NotAnIntern(UserId),

    /// The referenced user does not hold the analyst role.
    #[error("user {0} is not an analyst")]
    NotAnAnalyst(UserId),

    /// An analyst may only assign interns on leads they own.
    #[error("you can only assign your own leads to interns")]
    NotLeadOwner,

    /// Partner operations require the lead to have an owner analyst.
    #[error("lead must have an owner analyst before assigning to interns")]
    OwnerRequired,

    /// The partner does not supervise the lead's owner analyst.
    #[error("you can only manage leads owned by analysts you supervise")]
    NotSupervisingOwner,

    /// The partner does not supervise the named analyst.
    #[error("analyst {0} does not report to you")]
    NotSupervisingAnalyst(UserId),

    /// The actor's role may not perform this operation.
    #[error("role {0} is not permitted to perform this operation")]
    RoleNotPermitted(Role),

    /// The lead is not currently assigned to the stated intern.
    #[error("lead {lead} is not currently assigned to intern {intern}")]
    NotAssignedToIntern {
        /// Lead identifier.
        lead: LeadId,
        /// Intern the caller claimed holds the lead.
        intern: UserId,
    },

    /// Intern reassignment requires both interns to report to the owner.
    #[error("both interns must report to the lead owner analyst")]
    InternsNotUnderOwner,

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] CrmRepositoryError),
}

/// Result type for assignment authority operations.
pub type AssignmentResult<T> = Result<T, AssignmentError>;

/// Hierarchical assignment and ownership authority.
#[derive(Clone)]
pub struct AssignmentService<R, A, C>
where
    R: CrmRepository,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    audit: Arc<A>,
    clock: Arc<C>,
}

impl<R, A, C> AssignmentService<R, A, C>
where
    R: CrmRepository,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    /// Creates a new assignment service.
    #[must_use]
    pub const fn new(repository: Arc<R>, audit: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            repository,
            audit,
            clock,
        }
    }

    async fn require_user(&self, id: &UserId, org: OrganizationId) -> AssignmentResult<User> {
        let user = self
            .repository
            .user(id)
            .await?
            .ok_or_else(|| AssignmentError::UserNotFound(id.clone()))?;
        if user.organization_id != org {
            return Err(AssignmentError::OutsideOrganization(id.clone()));
        }
        Ok(user)
    }

    async fn require_lead(&self, id: LeadId, org: OrganizationId) -> AssignmentResult<Lead> {
        self.repository
            .lead(id, org)
            .await?
            .ok_or(AssignmentError::LeadNotFound(id))
    }

    async fn require_intern(&self, id: &UserId, org: OrganizationId) -> AssignmentResult<User> {
        let user = self.require_user(id, org).await?;
        if user.role != Role::Intern {
            return Err(AssignmentError::NotAnIntern(id.clone()));
        }
        Ok(user)
    }

    async fn require_analyst(&self, id: &UserId, org: OrganizationId) -> AssignmentResult<User> {
        let user = self.require_user(id, org).await?;
        if user.role != Role::Analyst {
            return Err(AssignmentError::NotAnAnalyst(id.clone()));
        }
        Ok(user)
    }

    /// Assigns a set of interns to a lead, replacing any prior set.
    ///
    /// Analysts may only act on leads they own; a lead with no owner is
    /// implicitly claimed on first assignment. Partners may only act on
    /// leads owned by analysts they supervise. Admins are organization
    /// scoped only. Any intern of the organization may be assigned.
    ///
    /// # Errors
    ///
    /// Returns the violated rule as a specific [`AssignmentError`].
    pub async fn assign_interns(
        &self,
        lead_id: LeadId,
        org: OrganizationId,
        actor_id: &UserId,
        intern_ids: &[UserId],
        notes: Option<String>,
    ) -> AssignmentResult<()> {
        let actor = self.require_user(actor_id, org).await?;
        let lead = self.require_lead(lead_id, org).await?;

        let mut interns = Vec::with_capacity(intern_ids.len());
        for id in intern_ids {
            interns.push(self.require_intern(id, org).await?);
        }

        let mut claim_ownership = false;
        match actor.role {
            Role::Analyst => match &lead.owner_analyst_id {
                Some(owner) if owner != actor_id => return Err(AssignmentError::NotLeadOwner),
                Some(_) => {}
                None => claim_ownership = true,
            },
            Role::Partner => {
                let Some(owner) = &lead.owner_analyst_id else {
                    return Err(AssignmentError::OwnerRequired);
                };
                let supervises = self
                    .repository
                    .validate_partner_of(actor_id, owner, org)
                    .await?;
                if !supervises {
                    return Err(AssignmentError::NotSupervisingOwner);
                }
            }
            Role::Admin => {}
            Role::Intern => return Err(AssignmentError::RoleNotPermitted(Role::Intern)),
        }

        let now = self.clock.utc();
        let assignees: BTreeSet<UserId> = intern_ids.iter().cloned().collect();
        let mut patch = LeadPatch::at(now);
        if lead.stage == Stage::Universe {
            patch.universe_status = Some(UniverseStatus::from_assigned(!assignees.is_empty()));
        }
        if claim_ownership {
            patch.owner_analyst_id = Some(Some(actor_id.clone()));
        }
        patch.assignees = Some(assignees);
        self.repository
            .update_lead(lead_id, org, patch)
            .await?
            .ok_or(AssignmentError::LeadNotFound(lead_id))?;

        for id in intern_ids {
            self.repository
                .record_assignment(LeadAssignment {
                    organization_id: org,
                    lead_id,
                    assigned_by: actor_id.clone(),
                    assigned_to: Some(id.clone()),
                    notes: notes.clone(),
                    assigned_at: now,
                })
                .await?;
        }

        let names: Vec<&str> = interns.iter().map(|intern| intern.name.as_str()).collect();
        self.audit
            .record(
                AuditEvent::new(
                    org,
                    actor_id.clone(),
                    AuditAction::LeadAssignedIntern,
                    format!("Assigned lead to intern(s): {}", names.join(", ")),
                    now,
                )
                .for_lead(lead_id, lead.company_id),
            )
            .await;
        Ok(())
    }

    /// Moves a lead between two interns on the same team.
    ///
    /// The stated "from" intern must currently hold the lead. When the lead
    /// has an owner analyst, both interns must report to that owner; a
    /// partner actor must additionally supervise the owner, and an analyst
    /// actor must be the owner.
    ///
    /// # Errors
    ///
    /// Returns the violated rule as a specific [`AssignmentError`].
    pub async fn reassign_intern(
        &self,
        lead_id: LeadId,
        org: OrganizationId,
        actor_id: &UserId,
        from_intern: &UserId,
        to_intern: &UserId,
        notes: Option<String>,
    ) -> AssignmentResult<()> {
        let actor = self.require_user(actor_id, org).await?;
        if actor.role == Role::Intern {
            return Err(AssignmentError::RoleNotPermitted(Role::Intern));
        }
        let lead = self.require_lead(lead_id, org).await?;
        if !lead.is_assigned_to(from_intern) {
            return Err(AssignmentError::NotAssignedToIntern {
                lead: lead_id,
                intern: from_intern.clone(),
            });
        }
        self.require_intern(from_intern, org).await?;
        self.require_intern(to_intern, org).await?;

        if let Some(owner) = &lead.owner_analyst_id {
            let from_reports = self
                .repository
                .validate_analyst_of(owner, from_intern, org)
                .await?;
            let to_reports = self
                .repository
                .validate_analyst_of(owner, to_intern, org)
                .await?;
            if !from_reports || !to_reports {
                return Err(AssignmentError::InternsNotUnderOwner);
            }
            match actor.role {
                Role::Analyst if owner != actor_id => {
                    return Err(AssignmentError::NotLeadOwner);
                }
                Role::Partner => {
                    let supervises = self
                        .repository
                        .validate_partner_of(actor_id, owner, org)
                        .await?;
                    if !supervises {
                        return Err(AssignmentError::NotSupervisingOwner);
                    }
                }
                Role::Analyst | Role::Admin | Role::Intern => {}
            }
        }

        let now = self.clock.utc();
        let mut assignees = lead.assignees.clone();
        assignees.remove(from_intern);
        assignees.insert(to_intern.clone());
        let mut patch = LeadPatch::at(now);
        patch.assignees = Some(assignees);
        self.repository
            .update_lead(lead_id, org, patch)
            .await?
            .ok_or(AssignmentError::LeadNotFound(lead_id))?;

        self.repository
            .record_assignment(LeadAssignment {
                organization_id: org,
                lead_id,
                assigned_by: actor_id.clone(),
                assigned_to: Some(to_intern.clone()),
                notes: notes.or_else(|| {
                    Some(format!(
                        "Lead reassigned from intern {from_intern} to intern {to_intern}"
                    ))
                }),
                assigned_at: now,
            })
            .await?;

        self.audit
            .record(
                AuditEvent::new(
                    org,
                    actor_id.clone(),
                    AuditAction::LeadAssigned,
                    format!("Lead reassigned from intern {from_intern} to intern {to_intern}"),
                    now,
                )
                .for_lead(lead_id, lead.company_id)
                .with_change(from_intern.as_str(), to_intern.as_str()),
            )
            .await;
        Ok(())
    }

    /// Transfers an analyst's book of leads to another analyst.
    ///
    /// A partner actor must supervise both analysts; an admin actor skips
    /// the supervision checks. With `move_interns`, the source analyst's
    /// interns are re-pointed to the target analyst and keep their lead
    /// assignments. Without it, transferred leads assigned to interns still
    /// reporting to the source analyst are actively unassigned to prevent
    /// orphaned cross-team assignments.
    ///
    /// # Errors
    ///
    /// Returns the violated rule as a specific [`AssignmentError`].
    pub async fn reassign_analyst(
        &self,
        from_analyst: &UserId,
        to_analyst: &UserId,
        actor_id: &UserId,
        org: OrganizationId,
        move_interns: bool,
    ) -> AssignmentResult<ReassignmentSummary> {
        let actor = self.require_user(actor_id, org).await?;
        self.require_analyst(from_analyst, org).await?;
        self.require_analyst(to_analyst, org).await?;

        match actor.role {
            Role::Partner => {
                for analyst in [from_analyst, to_analyst] {
                    let supervises = self
                        .repository
                        .validate_partner_of(actor_id, analyst, org)
                        .await?;
                    if !supervises {
                        return Err(AssignmentError::NotSupervisingAnalyst(analyst.clone()));
                    }
                }
            }
            Role::Admin => {}
            role @ (Role::Analyst | Role::Intern) => {
                return Err(AssignmentError::RoleNotPermitted(role));
            }
        }

        let now = self.clock.utc();
        let owned_leads = self.repository.leads_by_owner(from_analyst, org).await?;
        for lead in &owned_leads {
            let mut patch = LeadPatch::at(now);
            patch.owner_analyst_id = Some(Some(to_analyst.clone()));
            self.repository.update_lead(lead.id, org, patch).await?;
        }

        let source_interns = self.repository.interns_of(from_analyst, org).await?;
        let mut interns_transferred = 0;
        if move_interns {
            // Interns keep their assigned leads; only the reporting line moves.
            for intern in &source_interns {
                self.repository
                    .set_intern_manager(&intern.id, org, to_analyst)
                    .await?;
                interns_transferred += 1;
            }
        } else {
            let source_ids: BTreeSet<&UserId> =
                source_interns.iter().map(|intern| &intern.id).collect();
            for lead in &owned_leads {
                let orphaned: Vec<&UserId> = lead
                    .assignees
                    .iter()
                    .filter(|assignee| source_ids.contains(assignee))
                    .collect();
                if orphaned.is_empty() {
                    continue;
                }
                let mut remaining = lead.assignees.clone();
                for assignee in orphaned {
                    remaining.remove(assignee);
                }
                let mut patch = LeadPatch::at(now);
                if lead.stage == Stage::Universe {
                    patch.universe_status =
                        Some(UniverseStatus::from_assigned(!remaining.is_empty()));
                }
                patch.assignees = Some(remaining);
                self.repository.update_lead(lead.id, org, patch).await?;
            }
        }

        let summary = ReassignmentSummary {
            leads_transferred: owned_leads.len(),
            interns_transferred,
        };
        self.audit
            .record(
                AuditEvent::new(
                    org,
                    actor_id.clone(),
                    AuditAction::AnalystReassigned,
                    format!(
                        "Transferred {} leads and {} interns from analyst {from_analyst} to \
                         analyst {to_analyst}",
                        summary.leads_transferred, summary.interns_transferred
                    ),
                    now,
                )
                .with_change(from_analyst.as_str(), to_analyst.as_str()),
            )
            .await;
        Ok(summary)
    }

    /// Bulk-transfers every lead assigned to one user to another user.
    ///
    /// Administrative override for partner and admin actors (offboarding):
    /// no hierarchy gating and no challenge token. Ownership follows when
    /// the target user is an analyst.
    ///
    /// # Errors
    ///
    /// Returns the violated rule as a specific [`AssignmentError`].
    pub async fn transfer_leads(
        &self,
        from_user: &UserId,
        to_user: &UserId,
        actor_id: &UserId,
        org: OrganizationId,
    ) -> AssignmentResult<TransferSummary> {
        let actor = self.require_user(actor_id, org).await?;
        match actor.role {
            Role::Partner | Role::Admin => {}
            role @ (Role::Analyst | Role::Intern) => {
                return Err(AssignmentError::RoleNotPermitted(role));
            }
        }
        self.require_user(from_user, org).await?;
        let target = self.require_user(to_user, org).await?;

        let now = self.clock.utc();
        let leads = self.repository.leads_by_assignee(from_user, org).await?;
        for lead in &leads {
            let mut assignees = BTreeSet::new();
            assignees.insert(to_user.clone());
            let mut patch = LeadPatch::at(now);
            if lead.stage == Stage::Universe {
                patch.universe_status = Some(UniverseStatus::Assigned);
            }
            if target.role == Role::Analyst {
                patch.owner_analyst_id = Some(Some(to_user.clone()));
            }
            patch.assignees = Some(assignees);
            self.repository.update_lead(lead.id, org, patch).await?;
            self.repository
                .record_assignment(LeadAssignment {
                    organization_id: org,
                    lead_id: lead.id,
                    assigned_by: actor_id.clone(),
                    assigned_to: Some(to_user.clone()),
                    notes: Some("Bulk transfer".to_owned()),
                    assigned_at: now,
                })
                .await?;
        }

        self.audit
            .record(
                AuditEvent::new(
                    org,
                    actor_id.clone(),
                    AuditAction::LeadsTransferred,
                    format!(
                        "Transferred {} leads from {from_user} to {to_user}",
                        leads.len()
                    ),
                    now,
                )
                .with_change(from_user.as_str(), to_user.as_str()),
            )
            .await;
        Ok(TransferSummary {
            leads_transferred: leads.len(),
        })
    }
}
