use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrative activation state of a student account.
///
/// Stored as an integer: `0` pending, `1` active, `2` or more promoted.
/// Transitions only happen through explicit admin actions.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    /// Registered, waiting for an administrator.
    #[default]
    Pending,
    /// May join courses and submit selections.
    Active,
    /// Active with administrative rights.
    Promoted,
}

/// Admin action applied to a student's activation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Reset,
    Promote,
    Demote,
}

impl ActivationState {
    pub const ALL: &'static [ActivationState] = &[Self::Pending, Self::Active, Self::Promoted];

    pub fn code(&self) -> i32 {
        match self {
            Self::Pending => 0,
            Self::Active => 1,
            Self::Promoted => 2,
        }
    }

    /// Interpret a stored code. Negative codes are not a valid state.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Active),
            c if c >= 2 => Some(Self::Promoted),
            _ => None,
        }
    }

    /// Next state up, saturating at `Promoted`.
    pub fn promoted(self) -> Self {
        match self {
            Self::Pending => Self::Active,
            Self::Active | Self::Promoted => Self::Promoted,
        }
    }

    /// Next state down, saturating at `Pending`.
    pub fn demoted(self) -> Self {
        match self {
            Self::Promoted => Self::Active,
            Self::Active | Self::Pending => Self::Pending,
        }
    }

    pub fn apply(self, transition: Transition) -> Self {
        match transition {
            Transition::Reset => Self::Pending,
            Transition::Promote => self.promoted(),
            Transition::Demote => self.demoted(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Promoted => "promoted",
        }
    }
}

impl fmt::Display for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reset => "reset",
            Self::Promote => "promote",
            Self::Demote => "demote",
        })
    }
}
