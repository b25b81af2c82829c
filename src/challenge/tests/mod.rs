//! Unit tests for the challenge-token bounded context.

mod authority_tests;
