//! Stage progression engine: validated, auto, and manual transitions.

use crate::pipeline::domain::{
    required_fields, validate_stage_requirements, AuditAction, AuditEvent, Contact, ContactId,
    Intervention, InterventionKind, Lead, LeadId, LeadPatch, OrganizationId, OutreachActivity,
    Stage, StageEvidence, StageValidation, UserId,
};
use crate::pipeline::ports::{AuditSink, CrmRepository, CrmRepositoryError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Comprehensive progression analysis for a lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageProgression {
    /// Stage the lead currently sits in.
    pub current_stage: Stage,
    /// Forward successor, `None` for terminal stages.
    pub next_stage: Option<Stage>,
    /// Whether the lead meets the next stage's requirements.
    pub can_progress: bool,
    /// Cumulative fields required to enter the next stage.
    pub required_fields: &'static [&'static str],
    /// Fields currently missing.
    pub missing_fields: Vec<String>,
    /// Human-readable validation failures.
    pub validation_errors: Vec<String>,
}

/// Outcome of an auto-progression attempt.
///
/// Auto-progression is a no-op when requirements are unmet, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoProgress {
    /// Whether the lead moved forward.
    pub progressed: bool,
    /// The stage the lead moved to, when it did.
    pub new_stage: Option<Stage>,
    /// Why the lead stayed put, when it did.
    pub errors: Vec<String>,
}

/// Request payload for a human-triggered stage move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualStageMove {
    /// Requested target stage.
    pub target: Stage,
    /// Default point of contact, required for `outreach → pitching`.
    pub default_poc_id: Option<ContactId>,
    /// Optional backup point of contact, distinct from the default.
    pub backup_poc_id: Option<ContactId>,
}

/// Errors raised by stage progression operations.
#[derive(Debug, Clone, Error)]
pub enum ProgressionError {
    /// The lead does not exist in the caller's organization.
    #[error("lead not found: {0}")]
    LeadNotFound(LeadId),

    /// The transition does not follow an edge of the stage graph.
    #[error("invalid stage transition from {from} to {to}")]
    InvalidTransition {
        /// Stage the lead currently sits in.
        from: Stage,
        /// Requested target stage.
        to: Stage,
    },

    /// The lead fails the target stage's entry requirements.
    #[error("stage requirements not met for {target}: {}", validation.errors.join(", "))]
    RequirementsNotMet {
        /// Requested target stage.
        target: Stage,
        /// Full validation outcome, including missing fields.
        validation: StageValidation,
    },

    /// The manual endpoint only supports three transitions.
    #[error(
        "manual moves support only qualified→outreach, outreach→pitching, or \
         pitching→mandates; current: {from}, requested: {to}"
    )]
    UnsupportedManualTransition {
        /// Stage the lead currently sits in.
        from: Stage,
        /// Requested target stage.
        to: Stage,
    },

    /// Moving to pitching requires a recorded meeting with POCs.
    #[error("cannot move to pitching: a meeting with POCs must be recorded first")]
    MeetingRequired,

    /// Moving to pitching requires selecting a default POC.
    #[error("cannot move to pitching: a default POC must be selected")]
    DefaultPocRequired,

    /// The selected POC is absent or belongs to another company.
    #[error("invalid POC {0}: contact must belong to the same company")]
    PocOutsideCompany(ContactId),

    /// The backup POC duplicates the default.
    #[error("backup POC must be different from the default POC")]
    BackupPocSameAsDefault,

    /// The lead is already rejected.
    #[error("lead {0} is already rejected")]
    AlreadyRejected(LeadId),

    /// The lead sits in a terminal stage and cannot be rejected.
    #[error("lead {lead} is in terminal stage {stage} and cannot be rejected")]
    TerminalStage {
        /// Lead identifier.
        lead: LeadId,
        /// Terminal stage the lead sits in.
        stage: Stage,
    },

    /// Rejection requires a non-empty reason.
    #[error("rejection reason is required")]
    EmptyRejectionReason,

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] CrmRepositoryError),
}

/// Result type for stage progression operations.
pub type ProgressionResult<T> = Result<T, ProgressionError>;

/// Stage progression decision engine.
///
/// Validation methods are pure reads; mutating methods persist a transition
/// only after its requirements hold, then emit audit events.
#[derive(Clone)]
pub struct StageProgressionService<R, A, C>
where
    R: CrmRepository,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    audit: Arc<A>,
    clock: Arc<C>,
}

/// Evidence records loaded for one validation pass.
struct LoadedEvidence {
    contacts: Vec<Contact>,
    activities: Vec<OutreachActivity>,
    interventions: Vec<Intervention>,
}

impl LoadedEvidence {
    fn as_stage_evidence(&self) -> StageEvidence<'_> {
        let contact = self
            .contacts
            .iter()
            .find(|contact| contact.is_primary)
            .or_else(|| self.contacts.first());
        StageEvidence {
            contact,
            activities: &self.activities,
            interventions: &self.interventions,
        }
    }
}

impl<R, A, C> StageProgressionService<R, A, C>
where
    R: CrmRepository,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    /// Creates a new stage progression service.
    #[must_use]
    pub const fn new(repository: Arc<R>, audit: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            repository,
            audit,
            clock,
        }
    }

    async fn require_lead(&self, id: LeadId, org: OrganizationId) -> ProgressionResult<Lead> {
        self.repository
            .lead(id, org)
            .await?
            .ok_or(ProgressionError::LeadNotFound(id))
    }

    async fn load_evidence(&self, lead: &Lead) -> ProgressionResult<LoadedEvidence> {
        let contacts = self
            .repository
            .contacts_by_company(lead.company_id, lead.organization_id)
            .await?;
        let activities = self
            .repository
            .outreach_activities(lead.id, lead.organization_id)
            .await?;
        let interventions = self
            .repository
            .interventions(lead.id, lead.organization_id)
            .await?;
        Ok(LoadedEvidence {
            contacts,
            activities,
            interventions,
        })
    }

    /// Validates a transition of a stored lead to `target`.
    ///
    /// Structurally invalid transitions and unmet requirements both surface
    /// as an invalid [`StageValidation`]; only an absent lead or a
    /// repository failure is an error. Repeated calls with no intervening
    /// mutation return identical results.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::LeadNotFound`] or a repository error.
    pub async fn validate_transition(
        &self,
        lead_id: LeadId,
        org: OrganizationId,
        target: Stage,
    ) -> ProgressionResult<StageValidation> {
        let lead = self.require_lead(lead_id, org).await?;
        if !lead.stage.can_transition_to(target) {
            return Ok(StageValidation::failed(format!(
                "Invalid stage transition from {} to {}",
                lead.stage, target
            )));
        }
        let evidence = self.load_evidence(&lead).await?;
        Ok(validate_stage_requirements(
            &lead,
            target,
            &evidence.as_stage_evidence(),
        ))
    }

    /// Analyzes whether a lead can advance to its forward successor.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::LeadNotFound`] or a repository error.
    pub async fn analyze_progression(
        &self,
        lead_id: LeadId,
        org: OrganizationId,
    ) -> ProgressionResult<StageProgression> {
        let lead = self.require_lead(lead_id, org).await?;
        let Some(next_stage) = lead.stage.forward_successor() else {
            return Ok(StageProgression {
                current_stage: lead.stage,
                next_stage: None,
                can_progress: false,
                required_fields: &[],
                missing_fields: Vec::new(),
                validation_errors: vec!["Lead is in a terminal stage".to_owned()],
            });
        };

        let evidence = self.load_evidence(&lead).await?;
        let validation =
            validate_stage_requirements(&lead, next_stage, &evidence.as_stage_evidence());
        Ok(StageProgression {
            current_stage: lead.stage,
            next_stage: Some(next_stage),
            can_progress: validation.is_valid(),
            required_fields: required_fields(next_stage),
            missing_fields: validation.missing_fields,
            validation_errors: validation.errors,
        })
    }

    /// Advances a lead to its forward successor when requirements hold.
    ///
    /// Unmet requirements make this a reported no-op, not an error; leads
    /// already at the furthest stage their data supports stay put.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::LeadNotFound`] or a repository error.
    pub async fn auto_progress(
        &self,
        lead_id: LeadId,
        org: OrganizationId,
    ) -> ProgressionResult<AutoProgress> {
        let analysis = self.analyze_progression(lead_id, org).await?;
        let Some(next_stage) = analysis.next_stage.filter(|_| analysis.can_progress) else {
            return Ok(AutoProgress {
                progressed: false,
                new_stage: None,
                errors: analysis.validation_errors,
            });
        };

        let mut patch = LeadPatch::at(self.clock.utc());
        patch.stage = Some(next_stage);
        let updated = self.repository.update_lead(lead_id, org, patch).await?;
        if updated.is_none() {
            return Ok(AutoProgress {
                progressed: false,
                new_stage: None,
                errors: vec!["Failed to update lead stage".to_owned()],
            });
        }
        Ok(AutoProgress {
            progressed: true,
            new_stage: Some(next_stage),
            errors: Vec::new(),
        })
    }

    /// Moves a lead to `target` through the generic validated path.
    ///
    /// This path enforces the full cumulative requirements, including the
    /// document gates (`pitching → mandates` needs a Letter of Engagement on
    /// file, `mandates → won` a Contract).
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::InvalidTransition`] for off-graph moves,
    /// [`ProgressionError::RequirementsNotMet`] when validation fails, and
    /// [`ProgressionError::LeadNotFound`] or a repository error otherwise.
    pub async fn progress_stage(
        &self,
        lead_id: LeadId,
        org: OrganizationId,
        actor: &UserId,
        target: Stage,
    ) -> ProgressionResult<Lead> {
        let lead = self.require_lead(lead_id, org).await?;
        if !lead.stage.can_transition_to(target) {
            return Err(ProgressionError::InvalidTransition {
                from: lead.stage,
                to: target,
            });
        }
        let evidence = self.load_evidence(&lead).await?;
        let validation = validate_stage_requirements(&lead, target, &evidence.as_stage_evidence());
        if !validation.is_valid() {
            return Err(ProgressionError::RequirementsNotMet { target, validation });
        }

        let now = self.clock.utc();
        let mut patch = LeadPatch::at(now);
        patch.stage = Some(target);
        let updated = self
            .repository
            .update_lead(lead_id, org, patch)
            .await?
            .ok_or(ProgressionError::LeadNotFound(lead_id))?;

        self.audit
            .record(
                AuditEvent::new(
                    org,
                    actor.clone(),
                    AuditAction::LeadStageChanged,
                    format!("Lead moved from {} to {}", lead.stage, target),
                    now,
                )
                .for_lead(lead_id, lead.company_id)
                .with_change(lead.stage.as_str(), target.as_str()),
            )
            .await;
        Ok(updated)
    }

    /// Performs a human-triggered stage move.
    ///
    /// Deliberately narrower than the stage graph: only
    /// `qualified → outreach`, `outreach → pitching`, and
    /// `pitching → mandates` are supported, forcing document-gated moves
    /// through [`Self::progress_stage`]. The `outreach → pitching` move
    /// requires a recorded meeting intervention and same-company POC
    /// selections.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::UnsupportedManualTransition`] for any
    /// other move, the POC/meeting guard errors for `outreach → pitching`,
    /// and [`ProgressionError::LeadNotFound`] or a repository error
    /// otherwise.
    pub async fn move_stage(
        &self,
        lead_id: LeadId,
        org: OrganizationId,
        actor: &UserId,
        request: ManualStageMove,
    ) -> ProgressionResult<Lead> {
        let lead = self.require_lead(lead_id, org).await?;
        let move_to_pitching = matches!(
            (lead.stage, request.target),
            (Stage::Outreach, Stage::Pitching)
        );
        let supported = move_to_pitching
            || matches!(
                (lead.stage, request.target),
                (Stage::Qualified, Stage::Outreach) | (Stage::Pitching, Stage::Mandates)
            );
        if !supported {
            return Err(ProgressionError::UnsupportedManualTransition {
                from: lead.stage,
                to: request.target,
            });
        }

        let now = self.clock.utc();
        let mut patch = LeadPatch::at(now);
        patch.stage = Some(request.target);

        if move_to_pitching {
            let default_poc = self.check_pitching_guards(&lead, request).await?;
            patch.default_poc_id = Some(Some(default_poc));
            patch.backup_poc_id = Some(request.backup_poc_id);
        }

        let updated = self
            .repository
            .update_lead(lead_id, org, patch)
            .await?
            .ok_or(ProgressionError::LeadNotFound(lead_id))?;

        self.audit
            .record(
                AuditEvent::new(
                    org,
                    actor.clone(),
                    AuditAction::LeadStageChanged,
                    format!(
                        "Lead manually moved from {} to {}",
                        lead.stage, request.target
                    ),
                    now,
                )
                .for_lead(lead_id, lead.company_id)
                .with_change(lead.stage.as_str(), request.target.as_str()),
            )
            .await;
        Ok(updated)
    }

    async fn check_pitching_guards(
        &self,
        lead: &Lead,
        request: ManualStageMove,
    ) -> ProgressionResult<ContactId> {
        let interventions = self
            .repository
            .interventions(lead.id, lead.organization_id)
            .await?;
        let has_meeting = interventions
            .iter()
            .any(|intervention| intervention.kind == InterventionKind::Meeting);
        if !has_meeting {
            return Err(ProgressionError::MeetingRequired);
        }

        let Some(default_poc) = request.default_poc_id else {
            return Err(ProgressionError::DefaultPocRequired);
        };
        self.require_company_contact(default_poc, lead).await?;

        if let Some(backup_poc) = request.backup_poc_id {
            if backup_poc == default_poc {
                return Err(ProgressionError::BackupPocSameAsDefault);
            }
            self.require_company_contact(backup_poc, lead).await?;
        }
        Ok(default_poc)
    }

    async fn require_company_contact(
        &self,
        contact_id: ContactId,
        lead: &Lead,
    ) -> ProgressionResult<()> {
        match self
            .repository
            .contact(contact_id, lead.organization_id)
            .await?
        {
            Some(found) if found.company_id == lead.company_id => Ok(()),
            _ => Err(ProgressionError::PocOutsideCompany(contact_id)),
        }
    }

    /// Rejects a lead out of the pipeline with a mandatory reason.
    ///
    /// Available from any non-terminal stage. The reason is stored in the
    /// lead's notes; the prior stage is captured in the audit event.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::EmptyRejectionReason`],
    /// [`ProgressionError::AlreadyRejected`],
    /// [`ProgressionError::TerminalStage`] for won/lost leads, and
    /// [`ProgressionError::LeadNotFound`] or a repository error otherwise.
    pub async fn reject(
        &self,
        lead_id: LeadId,
        org: OrganizationId,
        actor: &UserId,
        reason: &str,
    ) -> ProgressionResult<Lead> {
        if reason.trim().is_empty() {
            return Err(ProgressionError::EmptyRejectionReason);
        }
        let lead = self.require_lead(lead_id, org).await?;
        if lead.stage == Stage::Rejected {
            return Err(ProgressionError::AlreadyRejected(lead_id));
        }
        if lead.stage.is_terminal() {
            return Err(ProgressionError::TerminalStage {
                lead: lead_id,
                stage: lead.stage,
            });
        }

        let now = self.clock.utc();
        let mut patch = LeadPatch::at(now);
        patch.stage = Some(Stage::Rejected);
        patch.notes = Some(Some(reason.trim().to_owned()));
        let updated = self
            .repository
            .update_lead(lead_id, org, patch)
            .await?
            .ok_or(ProgressionError::LeadNotFound(lead_id))?;

        self.audit
            .record(
                AuditEvent::new(
                    org,
                    actor.clone(),
                    AuditAction::LeadRejected,
                    format!(
                        "Lead rejected from {} stage. Reason: {}",
                        lead.stage,
                        reason.trim()
                    ),
                    now,
                )
                .for_lead(lead_id, lead.company_id)
                .with_change(lead.stage.as_str(), Stage::Rejected.as_str()),
            )
            .await;
        Ok(updated)
    }
}
