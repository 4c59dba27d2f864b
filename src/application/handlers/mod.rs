//! Application handlers.
//!
//! Command handlers that orchestrate domain operations and ports.

pub mod turn;

pub use turn::{
    HandleTurnCommand, TurnDispatcher, TurnError, TurnResult, TurnSettings, CANCELED_TEXT,
    NOTHING_TO_CANCEL_TEXT,
};
