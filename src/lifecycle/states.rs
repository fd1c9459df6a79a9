use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states shared by every managed component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    /// Initial and terminal state
    #[default]
    Closed,
    /// Resources allocated, not yet processing
    Initialised,
    /// Actively processing
    Started,
    /// Processing suspended, resources still held
    Stopped,
}

impl ComponentState {
    /// Check if the component is currently processing
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Check if the component holds resources that a close would release
    pub fn holds_resources(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Check whether a single direct operation can move from this state to `target`
    pub fn can_transition_to(&self, target: ComponentState) -> bool {
        use ComponentState::*;

        matches!(
            (self, target),
            (Closed, Initialised)
                | (Stopped, Initialised)
                | (Initialised, Started)
                | (Stopped, Started)
                | (Started, Stopped)
                | (Initialised, Closed)
                | (Stopped, Closed)
        )
    }

    /// Shortest chain of states (excluding `self`) needed to reach `target`
    pub fn path_to(&self, target: ComponentState) -> Vec<ComponentState> {
        use ComponentState::*;

        match (self, target) {
            (from, to) if *from == to => vec![],
            (Closed, Initialised) => vec![Initialised],
            (Closed, Started) => vec![Initialised, Started],
            (Closed, Stopped) => vec![Initialised, Started, Stopped],
            (Initialised, Started) => vec![Started],
            (Initialised, Stopped) => vec![Started, Stopped],
            (Initialised, Closed) => vec![Closed],
            (Started, Stopped) => vec![Stopped],
            (Started, Closed) => vec![Stopped, Closed],
            (Started, Initialised) => vec![Stopped, Initialised],
            (Stopped, Started) => vec![Started],
            (Stopped, Initialised) => vec![Initialised],
            (Stopped, Closed) => vec![Closed],
            _ => vec![],
        }
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Initialised => write!(f, "initialised"),
            Self::Started => write!(f, "started"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

impl std::str::FromStr for ComponentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "closed" => Ok(Self::Closed),
            "initialised" => Ok(Self::Initialised),
            "started" => Ok(Self::Started),
            "stopped" => Ok(Self::Stopped),
            _ => Err(format!("Invalid component state: {s}")),
        }
    }
}
