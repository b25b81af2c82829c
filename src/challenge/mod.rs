//! One-time challenge tokens for sensitive reassignments.
//!
//! Reassigning a lead away from an existing assignee requires a fresh,
//! narrowly-scoped proof of intent. This module issues short-lived tokens
//! bound to a (user, organization, lead, purpose) tuple, rate-limits their
//! creation, and consumes each token at most once. Tokens and rate-limit
//! counters are process-local, ephemeral state behind the [`ports`] store
//! contract; they are not part of the durable data model.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
