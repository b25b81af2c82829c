//! Domain model for the deal pipeline.
//!
//! The pipeline domain models leads, the people attached to them, the stage
//! progression state machine, and the evidence records (contacts, outreach
//! activities, interventions) that gate stage transitions, while keeping all
//! infrastructure concerns outside of the domain boundary.

mod assignment;
mod audit;
mod contact;
mod error;
mod evidence;
mod ids;
mod lead;
mod stage;
mod user;
mod validation;

pub use assignment::LeadAssignment;
pub use audit::{AuditAction, AuditEvent};
pub use contact::{Contact, ContactPatch, NewContact};
pub use error::{ParseRoleError, ParseStageError};
pub use evidence::{
    ActivityStatus, Intervention, InterventionKind, OutreachActivity, CONTRACT_DOCUMENT,
    LETTER_OF_ENGAGEMENT_DOCUMENT,
};
pub use ids::{ActivityId, CompanyId, ContactId, InterventionId, LeadId, OrganizationId, UserId};
pub use lead::{Lead, LeadPatch, NewLead, PocStatus};
pub use stage::{Stage, UniverseStatus};
pub use user::{Role, User};
pub use validation::{
    required_fields, validate_stage_requirements, StageEvidence, StageValidation,
};
