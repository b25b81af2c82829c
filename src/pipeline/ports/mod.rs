//! Port contracts for the deal pipeline.
//!
//! Ports define infrastructure-agnostic interfaces used by pipeline
//! services.

pub mod audit;
pub mod repository;

pub use audit::AuditSink;
pub use repository::{CrmRepository, CrmRepositoryError, CrmRepositoryResult};
