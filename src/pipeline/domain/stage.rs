//! Pipeline stage state machine.

use super::ParseStageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a lead in the fixed deal pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Initial, unqualified pool of leads.
    Universe,
    /// Lead has a complete point of contact.
    Qualified,
    /// Lead is assigned and being contacted.
    Outreach,
    /// Lead is being pitched after a recorded meeting.
    Pitching,
    /// Lead has signed a Letter of Engagement.
    Mandates,
    /// Deal closed successfully.
    Won,
    /// Deal lost after pitching or mandates.
    Lost,
    /// Lead rejected out of the pipeline.
    Rejected,
}

impl Stage {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Universe => "universe",
            Self::Qualified => "qualified",
            Self::Outreach => "outreach",
            Self::Pitching => "pitching",
            Self::Mandates => "mandates",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Rejected => "rejected",
        }
    }

    /// Returns the stages directly reachable from this stage.
    ///
    /// The forward branch is listed first; `rejected`/`lost` branches follow.
    #[must_use]
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::Universe => &[Self::Qualified],
            Self::Qualified => &[Self::Outreach, Self::Rejected],
            Self::Outreach => &[Self::Pitching, Self::Rejected],
            Self::Pitching => &[Self::Mandates, Self::Lost, Self::Rejected],
            Self::Mandates => &[Self::Won, Self::Lost, Self::Rejected],
            Self::Won | Self::Lost | Self::Rejected => &[],
        }
    }

    /// Returns the single forward successor used by auto-progression.
    ///
    /// For branching nodes this is the forward branch, never `rejected` or
    /// `lost`. Terminal stages have no forward successor.
    #[must_use]
    pub fn forward_successor(self) -> Option<Self> {
        self.successors().first().copied()
    }

    /// Reports whether a transition to `target` is structurally valid.
    ///
    /// A transition is structurally valid when the target equals the current
    /// stage (no-op) or is listed as a successor. Structural validity is
    /// necessary but not sufficient; each target stage also has entry
    /// requirements checked by
    /// [`validate_stage_requirements`](super::validate_stage_requirements).
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self == target || self.successors().contains(&target)
    }

    /// Reports whether this stage has no outgoing edges.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

impl TryFrom<&str> for Stage {
    type Error = ParseStageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "universe" => Ok(Self::Universe),
            "qualified" => Ok(Self::Qualified),
            "outreach" => Ok(Self::Outreach),
            "pitching" => Ok(Self::Pitching),
            "mandates" => Ok(Self::Mandates),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseStageError(value.to_owned())),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim sub-state of a lead, meaningful only while in [`Stage::Universe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniverseStatus {
    /// Lead sits unclaimed in the universe pool.
    Open,
    /// Lead has been claimed by an assignee.
    Assigned,
}

impl UniverseStatus {
    /// Derives the status from assignee presence.
    #[must_use]
    pub const fn from_assigned(has_assignee: bool) -> Self {
        if has_assignee {
            Self::Assigned
        } else {
            Self::Open
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
        }
    }
}

impl fmt::Display for UniverseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
