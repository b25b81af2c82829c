//! End-to-end scenarios exercising the public crate surface.
//!
//! Each test wires the in-memory adapters into the real services and walks
//! one complete flow: lead creation by role, contact-driven auto-advance,
//! the meeting gate on manual pitching moves, and challenge-token issue,
//! consumption, and rate limiting.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use dealflow::challenge::adapters::memory::InMemoryTokenStore;
use dealflow::challenge::domain::TokenPurpose;
use dealflow::challenge::services::ChallengeTokenAuthority;
use dealflow::pipeline::adapters::memory::{InMemoryAuditSink, InMemoryCrmRepository};
use dealflow::pipeline::domain::{
    CompanyId, Lead, NewContact, NewLead, OrganizationId, PocStatus, Role, Stage, UniverseStatus,
    User, UserId,
};
use dealflow::pipeline::ports::CrmRepository;
use dealflow::pipeline::services::{
    CreateLeadRequest, LeadLifecycleService, ManualStageMove, ProgressionError,
    StageProgressionService,
};
use mockable::Clock;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Deterministic clock the tests can advance by hand.
struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        Self {
            now: Mutex::new(start),
        }
    }

    fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct World {
    repository: Arc<InMemoryCrmRepository>,
    clock: Arc<ManualClock>,
    lifecycle:
        LeadLifecycleService<InMemoryCrmRepository, InMemoryAuditSink, InMemoryTokenStore, ManualClock>,
    progression: StageProgressionService<InMemoryCrmRepository, InMemoryAuditSink, ManualClock>,
}

fn org() -> OrganizationId {
    OrganizationId::new(1)
}

fn company() -> CompanyId {
    CompanyId::new(10)
}

fn world() -> World {
    let repository = Arc::new(InMemoryCrmRepository::new());
    let audit = Arc::new(InMemoryAuditSink::new());
    let clock = Arc::new(ManualClock::new());
    let lifecycle = LeadLifecycleService::new(
        Arc::clone(&repository),
        Arc::clone(&audit),
        Arc::new(InMemoryTokenStore::new()),
        Arc::clone(&clock),
    );
    let progression =
        StageProgressionService::new(Arc::clone(&repository), audit, Arc::clone(&clock));

    for (id, role) in [
        ("admin-1", Role::Admin),
        ("analyst-1", Role::Analyst),
    ] {
        repository
            .seed_user(User {
                id: UserId::new(id),
                organization_id: org(),
                role,
                name: id.to_owned(),
                partner_id: None,
                analyst_id: None,
            })
            .expect("seed user");
    }

    World {
        repository,
        clock,
        lifecycle,
        progression,
    }
}

fn request() -> CreateLeadRequest {
    CreateLeadRequest {
        company_id: company(),
        pipeline_value: None,
        probability: Decimal::ZERO,
        notes: None,
    }
}

async fn seed_lead_at(world: &World, stage: Stage, assignee: &str) -> Lead {
    let assignees: BTreeSet<UserId> = [UserId::new(assignee)].into_iter().collect();
    world
        .repository
        .create_lead(NewLead {
            organization_id: org(),
            company_id: company(),
            stage,
            universe_status: UniverseStatus::Assigned,
            owner_analyst_id: None,
            assignees,
            pipeline_value: None,
            probability: Decimal::ZERO,
            notes: None,
            created_at: world.clock.utc(),
        })
        .await
        .expect("seed lead")
}

#[tokio::test(flavor = "multi_thread")]
async fn analyst_creation_yields_an_owned_qualified_lead() {
    let world = world();
    let lead = world
        .lifecycle
        .create_lead(&UserId::new("analyst-1"), org(), request())
        .await
        .expect("create lead");

    assert_eq!(lead.stage, Stage::Qualified);
    assert_eq!(lead.owner_analyst_id, Some(UserId::new("analyst-1")));
    assert_eq!(lead.primary_assignee(), Some(&UserId::new("analyst-1")));
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_creation_yields_an_open_universe_lead() {
    let world = world();
    let lead = world
        .lifecycle
        .create_lead(&UserId::new("admin-1"), org(), request())
        .await
        .expect("create lead");

    assert_eq!(lead.stage, Stage::Universe);
    assert_eq!(lead.owner_analyst_id, None);
    assert!(!lead.has_assignee());
    assert_eq!(lead.universe_status, UniverseStatus::Open);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_complete_contact_advances_a_universe_lead() {
    let world = world();
    let admin = UserId::new("admin-1");
    let lead = world
        .lifecycle
        .create_lead(&admin, org(), request())
        .await
        .expect("create lead");

    world
        .lifecycle
        .create_contact(
            &admin,
            NewContact {
                organization_id: org(),
                company_id: company(),
                name: "Jane Doe".to_owned(),
                designation: "CFO".to_owned(),
                linkedin_profile: "https://linkedin.com/in/jane".to_owned(),
                email: None,
                is_primary: true,
            },
        )
        .await
        .expect("create contact");

    let stored = world
        .repository
        .lead(lead.id, org())
        .await
        .expect("lookup")
        .expect("lead exists");
    assert_eq!(stored.poc_count, 1);
    assert_eq!(stored.poc_status, PocStatus::Amber);
    assert_ne!(stored.stage, Stage::Universe);
}

#[tokio::test(flavor = "multi_thread")]
async fn pitching_is_gated_on_a_recorded_meeting() {
    let world = world();
    let lead = seed_lead_at(&world, Stage::Outreach, "analyst-1").await;

    let result = world
        .progression
        .move_stage(
            lead.id,
            org(),
            &UserId::new("analyst-1"),
            ManualStageMove {
                target: Stage::Pitching,
                default_poc_id: None,
                backup_poc_id: None,
            },
        )
        .await;

    assert!(matches!(result, Err(ProgressionError::MeetingRequired)));
}

#[tokio::test(flavor = "multi_thread")]
async fn a_challenge_token_is_consumed_on_first_validation() {
    let world = world();
    let lead = seed_lead_at(&world, Stage::Qualified, "analyst-1").await;
    let token = world
        .lifecycle
        .issue_reassignment_token(&UserId::new("admin-1"), org(), lead.id)
        .await
        .expect("issue token");

    let first = world
        .lifecycle
        .assign_lead(
            lead.id,
            org(),
            &UserId::new("admin-1"),
            Some(UserId::new("admin-1")),
            None,
            Some(&token),
        )
        .await
        .expect("token-backed reassignment");
    assert!(first.lead.is_assigned_to(&UserId::new("admin-1")));

    // The same token can never authorize a second reassignment.
    let reuse = world
        .lifecycle
        .assign_lead(
            lead.id,
            org(),
            &UserId::new("admin-1"),
            Some(UserId::new("analyst-1")),
            None,
            Some(&token),
        )
        .await;
    assert!(reuse.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn token_creation_is_rate_limited_per_window() {
    let store = Arc::new(InMemoryTokenStore::new());
    let clock = Arc::new(ManualClock::new());
    let authority = ChallengeTokenAuthority::new(Arc::clone(&store), Arc::clone(&clock));
    let user = UserId::new("analyst-1");

    for _ in 0..10 {
        authority
            .create_token(user.clone(), org(), dealflow::pipeline::domain::LeadId::new(7), TokenPurpose::Reassignment)
            .await
            .expect("within quota");
    }
    let eleventh = authority
        .create_token(
            user.clone(),
            org(),
            dealflow::pipeline::domain::LeadId::new(7),
            TokenPurpose::Reassignment,
        )
        .await;
    assert!(eleventh.is_err());

    clock.advance(Duration::hours(1) + Duration::seconds(1));
    authority
        .create_token(
            user,
            org(),
            dealflow::pipeline::domain::LeadId::new(7),
            TokenPurpose::Reassignment,
        )
        .await
        .expect("fresh window");
}
