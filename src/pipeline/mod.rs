//! Deal-pipeline lead management.
//!
//! This module implements the pipeline bounded context: companies' deal
//! candidacies ("leads") moving through a fixed progression of stages, the
//! per-stage entry requirements gating each move, and the Partner → Analyst
//! → Intern assignment hierarchy that controls who may move or assign a
//! lead. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
