//! Token issuing and one-time validation.

use crate::challenge::domain::{ChallengeTokenRecord, RateKey, TokenBinding, TokenPurpose};
use crate::challenge::ports::{ConsumeOutcome, TokenStore};
use crate::pipeline::domain::{LeadId, OrganizationId, UserId};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Token creation exceeded the per-user quota.
///
/// Distinguishable from ordinary failures so transport layers can map it to
/// a back-off response (HTTP 429).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("challenge token rate limit exceeded, window resets at {reset_at}")]
pub struct RateLimitError {
    /// When the caller's window resets.
    pub reset_at: DateTime<Utc>,
}

/// Issues and validates one-time challenge tokens.
#[derive(Clone)]
pub struct ChallengeTokenAuthority<S, C>
where
    S: TokenStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ChallengeTokenAuthority<S, C>
where
    S: TokenStore,
    C: Clock + Send + Sync,
{
    /// Tokens a user may create per rolling window.
    pub const RATE_LIMIT_PER_WINDOW: u32 = 10;

    /// Lifetime of an issued token.
    #[must_use]
    pub fn token_ttl() -> Duration {
        Duration::minutes(5)
    }

    /// Length of the rate-limit window.
    #[must_use]
    pub fn rate_window() -> Duration {
        Duration::hours(1)
    }

    /// Creates a new token authority.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Issues a token bound to `(user, org, lead, purpose)`.
    ///
    /// Expired tokens and stale windows are purged opportunistically on each
    /// call; no background sweep is required.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError`] when the caller exceeds
    /// [`Self::RATE_LIMIT_PER_WINDOW`] creations inside one window.
    pub async fn create_token(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        lead_id: LeadId,
        purpose: TokenPurpose,
    ) -> Result<String, RateLimitError> {
        let now = self.clock.utc();
        self.store.purge_expired(now).await;

        let key = RateKey {
            user_id: user_id.clone(),
            organization_id,
        };
        self.store
            .try_count(&key, now, Self::RATE_LIMIT_PER_WINDOW, Self::rate_window())
            .await
            .map_err(|reset_at| RateLimitError { reset_at })?;

        let token = Uuid::new_v4().simple().to_string();
        let record = ChallengeTokenRecord {
            token: token.clone(),
            binding: TokenBinding {
                user_id,
                organization_id,
                lead_id,
                purpose,
            },
            created_at: now,
            expires_at: now + Self::token_ttl(),
        };
        self.store.put(record).await;
        Ok(token)
    }

    /// Validates and consumes a token, returning whether it was accepted.
    ///
    /// Ordinary invalidity (absent, expired, mismatched binding) yields
    /// `false` rather than an error. A successful validation consumes the
    /// token: a second call with the same token always returns `false`.
    pub async fn validate_token(
        &self,
        token: &str,
        user_id: UserId,
        organization_id: OrganizationId,
        lead_id: LeadId,
        purpose: TokenPurpose,
    ) -> bool {
        let binding = TokenBinding {
            user_id,
            organization_id,
            lead_id,
            purpose,
        };
        let outcome = self.store.consume(token, &binding, self.clock.utc()).await;
        outcome == ConsumeOutcome::Consumed
    }
}
