//! Challenge-token orchestration services.

pub mod authority;

pub use authority::{ChallengeTokenAuthority, RateLimitError};
