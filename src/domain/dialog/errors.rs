//! Error types for the dialog core.
//!
//! Recognition failures never appear here: prompts recover from them
//! locally by re-prompting. Cancellation is a turn status, not an error.

use crate::domain::foundation::{DialogId, ValidationError};

/// Misconfigured dialog graph. Always fatal for the flow.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StructuralError {
    #[error("Slot set '{0}' has no slots")]
    EmptySlotSet(DialogId),

    #[error("Slot '{slot}' is declared more than once in '{dialog}'")]
    DuplicateSlot { dialog: DialogId, slot: String },

    #[error("Dialog '{0}' is registered more than once")]
    DuplicateDialog(DialogId),

    #[error("Unknown dialog: {0}")]
    UnknownDialog(DialogId),

    #[error("Dialog '{dialog}' expects '{target}' to be a slot set")]
    NotASlotSet { dialog: DialogId, target: DialogId },

    #[error("Slot set '{0}' contains itself")]
    CyclicSlotSet(DialogId),

    #[error("Invalid definition for '{dialog}': {reason}")]
    InvalidDefinition { dialog: DialogId, reason: String },
}

/// Errors raised while driving dialogs.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum DialogError {
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("Frame state does not belong to dialog '{dialog}'")]
    FrameMismatch { dialog: DialogId },

    #[error("Slot '{slot}' was already filled: {source}")]
    SlotOverwrite {
        slot: String,
        #[source]
        source: ValidationError,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Failed to serialize dialog state: {0}")]
    Serialization(String),
}
