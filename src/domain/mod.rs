//! Domain layer containing the dialog state machine and its primitives.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, validation errors)
//! - `dialog` - Prompts, slot filling, presentation and the dialog stack

pub mod dialog;
pub mod foundation;
