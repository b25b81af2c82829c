//! Port contracts for challenge-token storage.

pub mod store;

pub use store::{ConsumeOutcome, TokenStore};
