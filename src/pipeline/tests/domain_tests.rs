//! Unit tests for pipeline domain entities.

use super::fixtures::{complete_contact, incomplete_contact, lead_at};
use crate::pipeline::domain::{
    Contact, LeadPatch, PocStatus, Role, Stage, UniverseStatus, UserId,
};
use crate::test_support::epoch;
use chrono::Duration;
use rstest::rstest;

fn contacts(total: usize, complete: usize) -> Vec<Contact> {
    (0..total)
        .map(|index| {
            let base = if index < complete {
                complete_contact()
            } else {
                incomplete_contact()
            };
            Contact {
                name: format!("Contact {index}"),
                ..base
            }
        })
        .collect()
}

#[rstest]
#[case(0, 0, PocStatus::Red)]
#[case(2, 0, PocStatus::Red)]
#[case(1, 1, PocStatus::Amber)]
#[case(2, 1, PocStatus::Amber)]
#[case(3, 1, PocStatus::Green)]
#[case(5, 5, PocStatus::Green)]
fn poc_status_truth_table(#[case] total: usize, #[case] complete: usize, #[case] expected: PocStatus) {
    assert_eq!(PocStatus::compute(&contacts(total, complete)), expected);
}

#[rstest]
#[case("Jane", "CFO", "https://linkedin.com/in/jane", true)]
#[case("", "CFO", "https://linkedin.com/in/jane", false)]
#[case("Jane", "   ", "https://linkedin.com/in/jane", false)]
#[case("Jane", "CFO", "", false)]
fn contact_completeness_requires_the_full_triple(
    #[case] name: &str,
    #[case] designation: &str,
    #[case] linkedin: &str,
    #[case] expected: bool,
) {
    let contact = Contact {
        name: name.to_owned(),
        designation: designation.to_owned(),
        linkedin_profile: linkedin.to_owned(),
        ..complete_contact()
    };
    assert_eq!(contact.is_complete(), expected);
}

#[rstest]
fn primary_assignee_is_first_in_id_order() {
    let mut lead = lead_at(Stage::Outreach);
    lead.assignees.insert(UserId::new("zara"));
    lead.assignees.insert(UserId::new("amir"));
    assert_eq!(lead.primary_assignee(), Some(&UserId::new("amir")));
    assert!(lead.has_assignee());
    assert!(lead.is_assigned_to(&UserId::new("zara")));
    assert!(!lead.is_assigned_to(&UserId::new("noor")));
}

#[rstest]
#[case(None, false)]
#[case(Some("   "), false)]
#[case(Some("lost on price"), true)]
fn notes_must_carry_content(#[case] notes: Option<&str>, #[case] expected: bool) {
    let mut lead = lead_at(Stage::Pitching);
    lead.notes = notes.map(str::to_owned);
    assert_eq!(lead.has_notes(), expected);
}

#[rstest]
fn lead_patch_distinguishes_untouched_from_cleared() {
    let mut lead = lead_at(Stage::Qualified);
    lead.owner_analyst_id = Some(UserId::new("ana"));
    lead.notes = Some("call scheduled".to_owned());

    let untouched = LeadPatch::at(epoch() + Duration::minutes(1));
    untouched.clone().apply(&mut lead);
    assert_eq!(lead.owner_analyst_id, Some(UserId::new("ana")));
    assert_eq!(lead.notes.as_deref(), Some("call scheduled"));
    assert_eq!(lead.updated_at, epoch() + Duration::minutes(1));

    let mut cleared = LeadPatch::at(epoch() + Duration::minutes(2));
    cleared.owner_analyst_id = Some(None);
    cleared.notes = Some(None);
    cleared.apply(&mut lead);
    assert_eq!(lead.owner_analyst_id, None);
    assert_eq!(lead.notes, None);
}

#[rstest]
#[case(false, UniverseStatus::Open)]
#[case(true, UniverseStatus::Assigned)]
fn universe_status_tracks_assignment(#[case] assigned: bool, #[case] expected: UniverseStatus) {
    assert_eq!(UniverseStatus::from_assigned(assigned), expected);
}

#[rstest]
fn role_round_trips_through_its_storage_form() {
    for role in [Role::Admin, Role::Partner, Role::Analyst, Role::Intern] {
        assert_eq!(Role::try_from(role.as_str()), Ok(role));
    }
    assert!(Role::try_from("associate").is_err());
}
