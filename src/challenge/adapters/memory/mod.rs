//! Process-local in-memory token store.

use crate::challenge::domain::{ChallengeTokenRecord, RateKey, TokenBinding};
use crate::challenge::ports::{ConsumeOutcome, TokenStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Thread-safe in-memory token and rate-limit store.
///
/// Tokens and counters live behind one mutex, so consumption is an atomic
/// check-and-delete and counter increments are never lost. State does not
/// survive a process restart; that is by contract for challenge tokens.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    state: Arc<Mutex<TokenState>>,
}

#[derive(Debug, Default)]
struct TokenState {
    tokens: HashMap<String, ChallengeTokenRecord>,
    windows: HashMap<RateKey, RateWindow>,
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    reset_at: DateTime<Utc>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TokenState> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the map state is still coherent for token bookkeeping.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of live tokens (test observability).
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.lock().tokens.len()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn put(&self, record: ChallengeTokenRecord) {
        self.lock().tokens.insert(record.token.clone(), record);
    }

    async fn consume(
        &self,
        token: &str,
        binding: &TokenBinding,
        now: DateTime<Utc>,
    ) -> ConsumeOutcome {
        let mut state = self.lock();
        let Some(record) = state.tokens.get(token) else {
            return ConsumeOutcome::Missing;
        };
        if record.is_expired(now) {
            state.tokens.remove(token);
            return ConsumeOutcome::Expired;
        }
        if record.binding != *binding {
            return ConsumeOutcome::Mismatch;
        }
        state.tokens.remove(token);
        ConsumeOutcome::Consumed
    }

    async fn try_count(
        &self,
        key: &RateKey,
        now: DateTime<Utc>,
        limit: u32,
        window: Duration,
    ) -> Result<(), DateTime<Utc>> {
        let mut state = self.lock();
        let entry = state
            .windows
            .entry(key.clone())
            .and_modify(|existing| {
                if existing.reset_at < now {
                    *existing = RateWindow {
                        count: 0,
                        reset_at: now + window,
                    };
                }
            })
            .or_insert(RateWindow {
                count: 0,
                reset_at: now + window,
            });
        if entry.count >= limit {
            return Err(entry.reset_at);
        }
        entry.count += 1;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) {
        let mut state = self.lock();
        state.tokens.retain(|_, record| !record.is_expired(now));
        state.windows.retain(|_, window| window.reset_at >= now);
    }
}
