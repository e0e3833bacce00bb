use std::fmt;

use serde::{Deserialize, Serialize};

/// Milestones of one playthrough, in the only order they can be reached.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressState {
    #[default]
    None,
    P1Done,
    P3Done,
    P4Done,
    P5Done,
    Finished,
}

impl ProgressState {
    pub const ALL: [ProgressState; 6] = [
        ProgressState::None,
        ProgressState::P1Done,
        ProgressState::P3Done,
        ProgressState::P4Done,
        ProgressState::P5Done,
        ProgressState::Finished,
    ];

    pub fn order_index(self) -> usize {
        self as usize
    }

    /// True once `required` has been reached. Stays true for every later
    /// state.
    pub fn unlocked(self, required: ProgressState) -> bool {
        self.order_index() >= required.order_index()
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgressState::None => "NONE",
            ProgressState::P1Done => "P1_DONE",
            ProgressState::P3Done => "P3_DONE",
            ProgressState::P4Done => "P4_DONE",
            ProgressState::P5Done => "P5_DONE",
            ProgressState::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for ProgressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
