//! Dealflow: multi-tenant deal-pipeline CRM core.
//!
//! This crate provides the decision logic for investment-bank-style lead
//! origination: the stage progression engine governing the lead lifecycle,
//! the hierarchical assignment and ownership authority, the lead lifecycle
//! orchestration layer, and the challenge-token authority gating sensitive
//! reassignments.
//!
//! # Architecture
//!
//! Dealflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory backends)
//!
//! # Modules
//!
//! - [`pipeline`]: Lead entities, stage progression, assignment authority
//! - [`challenge`]: One-time challenge tokens and rate limiting

pub mod challenge;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_support;
