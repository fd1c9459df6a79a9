use super::states::ComponentState;
use serde::{Deserialize, Serialize};

/// Direct lifecycle operations that trigger a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Init,
    Start,
    Stop,
    Close,
}

impl LifecycleEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Close => "close",
        }
    }

    /// State reached when the event succeeds
    pub fn target_state(&self) -> ComponentState {
        match self {
            Self::Init => ComponentState::Initialised,
            Self::Start => ComponentState::Started,
            Self::Stop => ComponentState::Stopped,
            Self::Close => ComponentState::Closed,
        }
    }

    /// Event that moves a component one step towards `target`
    pub fn for_target(target: ComponentState) -> Self {
        match target {
            ComponentState::Initialised => Self::Init,
            ComponentState::Started => Self::Start,
            ComponentState::Stopped => Self::Stop,
            ComponentState::Closed => Self::Close,
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_targets_round_trip() {
        for event in [
            LifecycleEvent::Init,
            LifecycleEvent::Start,
            LifecycleEvent::Stop,
            LifecycleEvent::Close,
        ] {
            assert_eq!(LifecycleEvent::for_target(event.target_state()), event);
        }
    }
}
