//! Unit tests for the stage transition graph.

use crate::pipeline::domain::Stage;
use rstest::rstest;

const ALL_STAGES: [Stage; 8] = [
    Stage::Universe,
    Stage::Qualified,
    Stage::Outreach,
    Stage::Pitching,
    Stage::Mandates,
    Stage::Won,
    Stage::Lost,
    Stage::Rejected,
];

#[rstest]
#[case(Stage::Universe, Stage::Qualified, true)]
#[case(Stage::Universe, Stage::Outreach, false)]
#[case(Stage::Universe, Stage::Pitching, false)]
#[case(Stage::Universe, Stage::Rejected, false)]
#[case(Stage::Qualified, Stage::Outreach, true)]
#[case(Stage::Qualified, Stage::Rejected, true)]
#[case(Stage::Qualified, Stage::Pitching, false)]
#[case(Stage::Outreach, Stage::Pitching, true)]
#[case(Stage::Outreach, Stage::Rejected, true)]
#[case(Stage::Outreach, Stage::Mandates, false)]
#[case(Stage::Pitching, Stage::Mandates, true)]
#[case(Stage::Pitching, Stage::Lost, true)]
#[case(Stage::Pitching, Stage::Rejected, true)]
#[case(Stage::Pitching, Stage::Won, false)]
#[case(Stage::Mandates, Stage::Won, true)]
#[case(Stage::Mandates, Stage::Lost, true)]
#[case(Stage::Mandates, Stage::Rejected, true)]
#[case(Stage::Won, Stage::Lost, false)]
#[case(Stage::Lost, Stage::Qualified, false)]
#[case(Stage::Rejected, Stage::Universe, false)]
fn can_transition_follows_graph_edges(
    #[case] from: Stage,
    #[case] to: Stage,
    #[case] expected: bool,
) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[rstest]
fn self_transition_is_always_allowed() {
    for stage in ALL_STAGES {
        assert!(stage.can_transition_to(stage), "{stage} to itself");
    }
}

#[rstest]
#[case(Stage::Universe, Some(Stage::Qualified))]
#[case(Stage::Qualified, Some(Stage::Outreach))]
#[case(Stage::Outreach, Some(Stage::Pitching))]
#[case(Stage::Pitching, Some(Stage::Mandates))]
#[case(Stage::Mandates, Some(Stage::Won))]
#[case(Stage::Won, None)]
#[case(Stage::Lost, None)]
#[case(Stage::Rejected, None)]
fn forward_successor_prefers_the_forward_branch(
    #[case] stage: Stage,
    #[case] expected: Option<Stage>,
) {
    assert_eq!(stage.forward_successor(), expected);
}

#[rstest]
#[case(Stage::Won, true)]
#[case(Stage::Lost, true)]
#[case(Stage::Rejected, true)]
#[case(Stage::Universe, false)]
#[case(Stage::Mandates, false)]
fn terminal_stages_have_no_successors(#[case] stage: Stage, #[case] terminal: bool) {
    assert_eq!(stage.is_terminal(), terminal);
    assert_eq!(stage.successors().is_empty(), terminal);
}

#[rstest]
fn stage_round_trips_through_its_storage_form() {
    for stage in ALL_STAGES {
        assert_eq!(Stage::try_from(stage.as_str()), Ok(stage));
    }
}

#[rstest]
fn unknown_stage_name_is_rejected() {
    assert!(Stage::try_from("funnel").is_err());
}
