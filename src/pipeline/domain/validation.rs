//! Cumulative stage-entry requirement validation.
//!
//! Each stage's requirements fold in the requirements of its structural
//! predecessor, checked recursively, so validating a target stage answers
//! "could this lead legitimately sit there" rather than "does it satisfy one
//! incremental gate". Validation is a pure function of the lead and its
//! evidence records; it never touches storage and never mutates state.

use super::{
    ActivityStatus, Contact, Intervention, Lead, OutreachActivity, Stage, CONTRACT_DOCUMENT,
    LETTER_OF_ENGAGEMENT_DOCUMENT,
};

/// Evidence records consulted by stage validation.
///
/// The contact is the company's primary point of contact (or the first one
/// on record when no primary is flagged).
#[derive(Debug, Clone, Copy)]
pub struct StageEvidence<'a> {
    /// Primary contact of the lead's company, when any exists.
    pub contact: Option<&'a Contact>,
    /// Outreach activities logged against the lead.
    pub activities: &'a [OutreachActivity],
    /// Interventions recorded against the lead.
    pub interventions: &'a [Intervention],
}

/// Outcome of validating a lead against a target stage's requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageValidation {
    /// Human-readable reasons the lead does not meet the requirements.
    pub errors: Vec<String>,
    /// Field identifiers a client can render to unblock progress.
    pub missing_fields: Vec<String>,
}

impl StageValidation {
    /// Creates a failed validation carrying a single reason.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            missing_fields: Vec::new(),
        }
    }

    /// Reports whether the lead meets every requirement.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, error: impl Into<String>, missing_field: impl Into<String>) {
        self.errors.push(error.into());
        self.missing_fields.push(missing_field.into());
    }

    fn absorb(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.missing_fields.extend(other.missing_fields);
    }
}

/// Validates a lead against the entry requirements of `target`.
///
/// Requirements are cumulative: each stage recursively includes the checks
/// of its structural predecessor. `won` and `lost` fold in the mandates or
/// pitching requirements depending on the lead's actual current stage.
#[must_use]
pub fn validate_stage_requirements(
    lead: &Lead,
    target: Stage,
    evidence: &StageEvidence<'_>,
) -> StageValidation {
    let mut validation = StageValidation::default();

    match target {
        Stage::Universe => {}
        Stage::Qualified => check_qualified(evidence, &mut validation),
        Stage::Outreach => {
            validation.absorb(validate_stage_requirements(lead, Stage::Qualified, evidence));
            if !lead.has_assignee() {
                validation.push(
                    "Lead must be assigned to a team member before outreach",
                    "assigned_to",
                );
            }
        }
        Stage::Pitching => {
            validation.absorb(validate_stage_requirements(lead, Stage::Outreach, evidence));
            check_pitching(evidence, &mut validation);
        }
        Stage::Mandates => {
            validation.absorb(validate_stage_requirements(lead, Stage::Pitching, evidence));
            if !has_document(evidence, LETTER_OF_ENGAGEMENT_DOCUMENT) {
                validation.push(
                    "Letter of Engagement document is required for the mandates stage",
                    LETTER_OF_ENGAGEMENT_DOCUMENT,
                );
            }
        }
        Stage::Won => {
            if lead.stage == Stage::Mandates {
                validation.absorb(validate_stage_requirements(lead, Stage::Mandates, evidence));
                if !has_document(evidence, CONTRACT_DOCUMENT) {
                    validation.push(
                        "Contract document is required to move from mandates to won",
                        CONTRACT_DOCUMENT,
                    );
                }
            } else {
                // Legacy direct pitching → won path.
                validation.absorb(validate_stage_requirements(lead, Stage::Pitching, evidence));
            }
            check_outcome_notes(lead, &mut validation);
        }
        Stage::Lost => {
            let predecessor = if lead.stage == Stage::Mandates {
                Stage::Mandates
            } else {
                Stage::Pitching
            };
            validation.absorb(validate_stage_requirements(lead, predecessor, evidence));
            check_outcome_notes(lead, &mut validation);
        }
        Stage::Rejected => {
            if !lead.has_notes() {
                validation.push("Rejection reason is required in notes", "notes");
            }
        }
    }

    validation
}

fn check_qualified(evidence: &StageEvidence<'_>, validation: &mut StageValidation) {
    let Some(contact) = evidence.contact else {
        validation.push(
            "Contact information is required for the qualified stage",
            "contact",
        );
        return;
    };
    if contact.name.trim().is_empty() {
        validation.push("Contact name is required", "contact.name");
    }
    if contact.designation.trim().is_empty() {
        validation.push("Contact designation is required", "contact.designation");
    }
    if contact.linkedin_profile.trim().is_empty() {
        validation.push("LinkedIn profile is required", "contact.linkedin_profile");
    }
}

fn check_pitching(evidence: &StageEvidence<'_>, validation: &mut StageValidation) {
    if evidence.activities.is_empty() {
        validation.push(
            "At least one outreach activity is required before the pitching stage",
            "outreach_activities",
        );
        return;
    }
    let has_completed = evidence
        .activities
        .iter()
        .any(|activity| activity.status == ActivityStatus::Completed);
    if !has_completed {
        validation.push(
            "At least one completed outreach activity is required before pitching",
            "completed_outreach",
        );
    }
}

fn check_outcome_notes(lead: &Lead, validation: &mut StageValidation) {
    if !lead.has_notes() {
        validation.push(
            "Deal outcome notes are required when closing a lead",
            "notes",
        );
    }
}

fn has_document(evidence: &StageEvidence<'_>, name: &str) -> bool {
    evidence
        .interventions
        .iter()
        .any(|intervention| intervention.is_document(name))
}

/// Returns the cumulative field identifiers required to enter `stage`.
#[must_use]
pub const fn required_fields(stage: Stage) -> &'static [&'static str] {
    const QUALIFIED: &[&str] = &[
        "contact.name",
        "contact.designation",
        "contact.linkedin_profile",
    ];
    const OUTREACH: &[&str] = &[
        "contact.name",
        "contact.designation",
        "contact.linkedin_profile",
        "assigned_to",
    ];
    const PITCHING: &[&str] = &[
        "contact.name",
        "contact.designation",
        "contact.linkedin_profile",
        "assigned_to",
        "outreach_activities",
    ];
    const MANDATES: &[&str] = &[
        "contact.name",
        "contact.designation",
        "contact.linkedin_profile",
        "assigned_to",
        "outreach_activities",
        LETTER_OF_ENGAGEMENT_DOCUMENT,
    ];
    const WON: &[&str] = &[
        "contact.name",
        "contact.designation",
        "contact.linkedin_profile",
        "assigned_to",
        "outreach_activities",
        CONTRACT_DOCUMENT,
        "notes",
    ];
    const LOST: &[&str] = &[
        "contact.name",
        "contact.designation",
        "contact.linkedin_profile",
        "assigned_to",
        "outreach_activities",
        "notes",
    ];

    match stage {
        Stage::Universe => &[],
        Stage::Qualified => QUALIFIED,
        Stage::Outreach => OUTREACH,
        Stage::Pitching => PITCHING,
        Stage::Mandates => MANDATES,
        Stage::Won => WON,
        Stage::Lost => LOST,
        Stage::Rejected => &["notes"],
    }
}
