//! Application layer - Handlers and built-in flows.
//!
//! This layer drives the dialog domain for each inbound activity and
//! coordinates it with the conversation state store port.

pub mod handlers;
pub mod profile_flow;

pub use handlers::{
    HandleTurnCommand, TurnDispatcher, TurnError, TurnResult, TurnSettings, CANCELED_TEXT,
    NOTHING_TO_CANCEL_TEXT,
};
pub use profile_flow::{profile_dialog_set, PROFILE_FLOW_YAML, PROFILE_ROOT_DIALOG};
