//! Onboarding state machine — tracks which dialog step a contact is in.

use serde::{Deserialize, Serialize};

/// The states of the onboarding conversation.
///
/// Progresses linearly: New → AwaitingName → AwaitingNameConfirm →
/// AwaitingLocation → AwaitingLocationConfirm → Active. A rejected
/// confirmation steps exactly one state back to the matching input state;
/// nothing ever skips forward or jumps further back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactState {
    New,
    AwaitingName,
    AwaitingNameConfirm,
    AwaitingLocation,
    AwaitingLocationConfirm,
    Active,
}

impl ContactState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ContactState) -> bool {
        use ContactState::*;
        matches!(
            (self, target),
            (New, AwaitingName)
                | (AwaitingName, AwaitingNameConfirm)
                | (AwaitingNameConfirm, AwaitingLocation)
                | (AwaitingNameConfirm, AwaitingName)
                | (AwaitingLocation, AwaitingLocationConfirm)
                | (AwaitingLocationConfirm, Active)
                | (AwaitingLocationConfirm, AwaitingLocation)
        )
    }

    /// Whether this state is terminal for the onboarding machine.
    ///
    /// Messages from an `Active` contact are routed to the intent parser,
    /// never back through onboarding.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// The next state in the forward progression, if any.
    pub fn next(&self) -> Option<ContactState> {
        use ContactState::*;
        match self {
            New => Some(AwaitingName),
            AwaitingName => Some(AwaitingNameConfirm),
            AwaitingNameConfirm => Some(AwaitingLocation),
            AwaitingLocation => Some(AwaitingLocationConfirm),
            AwaitingLocationConfirm => Some(Active),
            Active => None,
        }
    }

    /// The input state a negative confirmation falls back to, if this is a
    /// confirmation state.
    pub fn rejection_target(&self) -> Option<ContactState> {
        match self {
            Self::AwaitingNameConfirm => Some(Self::AwaitingName),
            Self::AwaitingLocationConfirm => Some(Self::AwaitingLocation),
            _ => None,
        }
    }
}

impl Default for ContactState {
    fn default() -> Self {
        Self::New
    }
}

impl std::fmt::Display for ContactState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::AwaitingName => "awaiting_name",
            Self::AwaitingNameConfirm => "awaiting_name_confirm",
            Self::AwaitingLocation => "awaiting_location",
            Self::AwaitingLocationConfirm => "awaiting_location_confirm",
            Self::Active => "active",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ContactState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "awaiting_name" => Ok(Self::AwaitingName),
            "awaiting_name_confirm" => Ok(Self::AwaitingNameConfirm),
            "awaiting_location" => Ok(Self::AwaitingLocation),
            "awaiting_location_confirm" => Ok(Self::AwaitingLocationConfirm),
            "active" => Ok(Self::Active),
            other => Err(format!("Unknown contact state: {other}")),
        }
    }
}
