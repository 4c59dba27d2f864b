//! Turn handling: cancellation, continuation and flow start for one
//! inbound activity, with per-conversation state persistence.

mod handle_turn;

pub use handle_turn::{
    HandleTurnCommand, TurnDispatcher, TurnError, TurnResult, TurnSettings, CANCELED_TEXT,
    NOTHING_TO_CANCEL_TEXT,
};
