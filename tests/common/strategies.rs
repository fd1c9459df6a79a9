use adapter_runtime::lifecycle::ComponentState;
use proptest::prelude::*;
use proptest::strategy::Just;

/// Strategy for generating identifiers accepted in configuration and object names
pub fn unique_id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,23}"
}

/// Strategy for generating lifecycle states
pub fn component_state_strategy() -> impl Strategy<Value = ComponentState> {
    prop_oneof![
        Just(ComponentState::Closed),
        Just(ComponentState::Initialised),
        Just(ComponentState::Started),
        Just(ComponentState::Stopped),
    ]
}

/// The idempotent lifecycle requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Init,
    Start,
    Stop,
    Close,
}

pub fn request_strategy() -> impl Strategy<Value = Request> {
    prop_oneof![
        Just(Request::Init),
        Just(Request::Start),
        Just(Request::Stop),
        Just(Request::Close),
    ]
}

pub fn request_sequence_strategy() -> impl Strategy<Value = Vec<Request>> {
    prop::collection::vec(request_strategy(), 0..24)
}

/// Newline separated payloads of up to 16 fragments
pub fn multi_line_payload_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z ]{0,12}", 1..16)
}
