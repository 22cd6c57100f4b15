//! Role checks, kept apart from the state transitions they guard.

use crate::config::AwardPolicy;
use crate::event::Event;
use crate::types::Identity;
use std::fmt;

/// Role-gated actions on an existing event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    CloseEvent,
    UpdateOracle,
    SubmitResult,
    AwardPoints,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CloseEvent => "close event",
            Self::UpdateOracle => "update oracle",
            Self::SubmitResult => "submit result",
            Self::AwardPoints => "award points",
        };
        f.write_str(label)
    }
}

/// Whether `caller` holds the role `action` requires on `event`.
///
/// Lifecycle state is not considered here.
pub fn can(caller: &Identity, event: &Event, action: Action, policy: AwardPolicy) -> bool {
    match action {
        Action::CloseEvent | Action::UpdateOracle => *caller == event.creator,
        Action::SubmitResult => *caller == event.oracle,
        Action::AwardPoints => match policy {
            AwardPolicy::Creator => *caller == event.creator,
            AwardPolicy::CreatorOrOracle => *caller == event.creator || *caller == event.oracle,
        },
    }
}
