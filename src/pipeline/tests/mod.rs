//! Unit tests for the pipeline bounded context.

mod fixtures;

mod domain_tests;
mod stage_transition_tests;
