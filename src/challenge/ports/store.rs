//! Token store port.

use crate::challenge::domain::{ChallengeTokenRecord, RateKey, TokenBinding};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Outcome of an atomic token consumption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Token matched its binding and was removed; exactly one caller ever
    /// observes this outcome per token.
    Consumed,
    /// Token exists but one or more bound fields mismatch; the token stays
    /// stored.
    Mismatch,
    /// Token had expired; it was removed.
    Expired,
    /// No such token.
    Missing,
}

/// Storage contract for tokens and rate-limit counters.
///
/// The store holds shared mutable process state. Implementations must make
/// [`TokenStore::consume`] an atomic check-and-delete and serialize counter
/// increments, so concurrent validation attempts cannot double-consume a
/// token and concurrent creations cannot lose counter updates. Backends may
/// be an in-memory map (tests, single instance) or a shared cache
/// (multi-instance deployment) without changing the authority's logic.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Stores an issued token.
    async fn put(&self, record: ChallengeTokenRecord);

    /// Atomically checks a token against `binding` and deletes it on match.
    ///
    /// Expired tokens are deleted on sight; mismatching tokens are left in
    /// place.
    async fn consume(
        &self,
        token: &str,
        binding: &TokenBinding,
        now: DateTime<Utc>,
    ) -> ConsumeOutcome;

    /// Counts one creation against the fixed window for `key`.
    ///
    /// A window opens on first use and resets once its deadline passes.
    /// Returns `Ok(())` while under `limit`, otherwise `Err` carrying the
    /// window's reset time.
    async fn try_count(
        &self,
        key: &RateKey,
        now: DateTime<Utc>,
        limit: u32,
        window: Duration,
    ) -> Result<(), DateTime<Utc>>;

    /// Drops expired tokens and stale rate-limit windows.
    async fn purge_expired(&self, now: DateTime<Utc>);
}
