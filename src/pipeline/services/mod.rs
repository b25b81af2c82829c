//! Orchestration services for the deal pipeline.

pub mod assignment;
pub mod lifecycle;
pub mod progression;

pub use assignment::{
    AssignmentError, AssignmentService, ReassignmentSummary, TransferSummary,
};
pub use lifecycle::{
    AssignLeadOutcome, AutoAdvancePolicy, CreateLeadRequest, LeadLifecycleService, LifecycleError,
};
pub use progression::{
    AutoProgress, ManualStageMove, ProgressionError, StageProgression, StageProgressionService,
};
