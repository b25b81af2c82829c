//! Service tests for token issuance and one-time validation.

use crate::challenge::adapters::memory::InMemoryTokenStore;
use crate::challenge::domain::TokenPurpose;
use crate::challenge::services::ChallengeTokenAuthority;
use crate::pipeline::domain::{LeadId, OrganizationId, UserId};
use crate::test_support::ManualClock;
use chrono::Duration;
use eyre::{ensure, Result};
use rstest::{fixture, rstest};
use std::sync::Arc;

struct Harness {
    store: Arc<InMemoryTokenStore>,
    clock: Arc<ManualClock>,
    authority: ChallengeTokenAuthority<InMemoryTokenStore, ManualClock>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryTokenStore::new());
    let clock = Arc::new(ManualClock::default());
    let authority = ChallengeTokenAuthority::new(Arc::clone(&store), Arc::clone(&clock));
    Harness {
        store,
        clock,
        authority,
    }
}

fn user() -> UserId {
    UserId::new("analyst-1")
}

fn org() -> OrganizationId {
    OrganizationId::new(1)
}

fn lead() -> LeadId {
    LeadId::new(7)
}

impl Harness {
    async fn issue(&self) -> Result<String> {
        Ok(self
            .authority
            .create_token(user(), org(), lead(), TokenPurpose::Reassignment)
            .await?)
    }

    async fn validate(&self, token: &str) -> bool {
        self.authority
            .validate_token(token, user(), org(), lead(), TokenPurpose::Reassignment)
            .await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_token_validates_exactly_once(harness: Harness) -> Result<()> {
    let token = harness.issue().await?;
    ensure!(harness.validate(&token).await);
    ensure!(!harness.validate(&token).await);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_unknown_token_is_rejected(harness: Harness) -> Result<()> {
    ensure!(!harness.validate("no-such-token").await);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_mismatched_binding_rejects_without_consuming(harness: Harness) -> Result<()> {
    let token = harness.issue().await?;

    let other_lead = harness
        .authority
        .validate_token(&token, user(), org(), LeadId::new(8), TokenPurpose::Reassignment)
        .await;
    ensure!(!other_lead);

    let other_user = harness
        .authority
        .validate_token(
            &token,
            UserId::new("partner-1"),
            org(),
            lead(),
            TokenPurpose::Reassignment,
        )
        .await;
    ensure!(!other_user);

    // The token survived both mismatches.
    ensure!(harness.validate(&token).await);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_expired_token_is_rejected(harness: Harness) -> Result<()> {
    let token = harness.issue().await?;
    harness.clock.advance(Duration::minutes(6));
    ensure!(!harness.validate(&token).await);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn the_eleventh_creation_in_a_window_is_rate_limited(harness: Harness) -> Result<()> {
    for _ in 0..10 {
        harness.issue().await?;
    }
    let denied = harness
        .authority
        .create_token(user(), org(), lead(), TokenPurpose::Reassignment)
        .await;
    let Err(err) = denied else {
        eyre::bail!("expected the 11th creation to be rejected");
    };
    ensure!(err.reset_at == crate::test_support::epoch() + Duration::hours(1));

    // A different user is unaffected.
    harness
        .authority
        .create_token(UserId::new("analyst-2"), org(), lead(), TokenPurpose::Reassignment)
        .await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn the_window_resets_after_an_hour(harness: Harness) -> Result<()> {
    for _ in 0..10 {
        harness.issue().await?;
    }
    ensure!(harness.issue().await.is_err());

    harness.clock.advance(Duration::hours(1) + Duration::seconds(1));
    harness.issue().await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creation_purges_expired_tokens(harness: Harness) -> Result<()> {
    harness.issue().await?;
    harness.issue().await?;
    ensure!(harness.store.token_count() == 2);

    harness.clock.advance(Duration::minutes(6));
    harness.issue().await?;
    ensure!(harness.store.token_count() == 1);
    Ok(())
}
