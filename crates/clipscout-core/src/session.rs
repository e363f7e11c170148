//! Session lifecycle state machine.
//!
//! A session tracks one user's topic-to-script run. At most one session per
//! user may be `Active` at a time; the persistence layer enforces that with
//! a partial unique index, while this module defines which status
//! transitions are legal. Terminal states admit no transitions; a new
//! topic always creates a fresh session.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Cancelled,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a session in `self` may move to `to`.
    ///
    /// Only `Active → Completed` and `Active → Cancelled` are legal.
    /// `current_step` labels carry no constraints of their own; they are
    /// advisory observability metadata updated at stage boundaries.
    #[must_use]
    pub const fn can_transition(self, to: SessionStatus) -> bool {
        matches!(
            (self, to),
            (
                SessionStatus::Active,
                SessionStatus::Completed | SessionStatus::Cancelled
            )
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}
