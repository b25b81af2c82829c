//! Shared entity builders for pipeline tests.

use crate::pipeline::domain::{
    ActivityId, ActivityStatus, CompanyId, Contact, ContactId, Intervention, InterventionId,
    InterventionKind, Lead, LeadId, OrganizationId, OutreachActivity, PocStatus, Role, Stage,
    UniverseStatus, User, UserId,
};
use crate::test_support::epoch;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

pub fn org() -> OrganizationId {
    OrganizationId::new(1)
}

pub fn company() -> CompanyId {
    CompanyId::new(10)
}

pub fn lead_at(stage: Stage) -> Lead {
    Lead {
        id: LeadId::new(1),
        organization_id: org(),
        company_id: company(),
        stage,
        universe_status: UniverseStatus::Open,
        owner_analyst_id: None,
        assignees: BTreeSet::new(),
        poc_count: 0,
        poc_status: PocStatus::Red,
        default_poc_id: None,
        backup_poc_id: None,
        pipeline_value: None,
        probability: Decimal::ZERO,
        notes: None,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub fn assigned_lead_at(stage: Stage, assignee: &UserId) -> Lead {
    let mut lead = lead_at(stage);
    lead.assignees.insert(assignee.clone());
    lead
}

pub fn complete_contact() -> Contact {
    Contact {
        id: ContactId::new(100),
        organization_id: org(),
        company_id: company(),
        name: "Jane Doe".to_owned(),
        designation: "CFO".to_owned(),
        linkedin_profile: "https://linkedin.com/in/jane".to_owned(),
        email: Some("jane@example.com".to_owned()),
        is_primary: true,
    }
}

pub fn incomplete_contact() -> Contact {
    Contact {
        designation: String::new(),
        ..complete_contact()
    }
}

pub fn user(id: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        organization_id: org(),
        role,
        name: format!("{role} {id}"),
        partner_id: None,
        analyst_id: None,
    }
}

pub fn analyst_under(id: &str, partner: &UserId) -> User {
    User {
        partner_id: Some(partner.clone()),
        ..user(id, Role::Analyst)
    }
}

pub fn intern_under(id: &str, analyst: &UserId) -> User {
    User {
        analyst_id: Some(analyst.clone()),
        ..user(id, Role::Intern)
    }
}

pub fn activity(id: u64, status: ActivityStatus) -> OutreachActivity {
    OutreachActivity {
        id: ActivityId::new(id),
        organization_id: org(),
        lead_id: LeadId::new(1),
        status,
        description: None,
        logged_at: epoch(),
    }
}

pub fn meeting(id: u64) -> Intervention {
    Intervention {
        id: InterventionId::new(id),
        organization_id: org(),
        lead_id: LeadId::new(1),
        kind: InterventionKind::Meeting,
        scheduled_at: epoch(),
        document_name: None,
    }
}

pub fn document(id: u64, name: &str) -> Intervention {
    Intervention {
        id: InterventionId::new(id),
        organization_id: org(),
        lead_id: LeadId::new(1),
        kind: InterventionKind::Document,
        scheduled_at: epoch(),
        document_name: Some(name.to_owned()),
    }
}
