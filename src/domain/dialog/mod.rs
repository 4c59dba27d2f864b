//! Slot-filling dialog core.
//!
//! Pure state machine: no I/O, no async. The turn handler in the
//! application layer loads a [`DialogState`], drives it through a
//! [`DialogContext`] and persists it again.
//!
//! - `activity` - inbound/outbound activities and the per-turn outbox
//! - `value` - filled values and the result tree
//! - `slot` - slot specifications
//! - `recognizer`, `validator` - prompt input handling
//! - `prompt`, `engine`, `presentation` - the three dialog kinds
//! - `dialog_set` - validated registry of dialogs
//! - `stack` - persisted frames
//! - `context` - the step driver
//! - `schema` - YAML flow definitions

mod activity;
mod context;
mod dialog_set;
mod engine;
mod errors;
mod presentation;
mod prompt;
mod recognizer;
mod schema;
mod slot;
mod stack;
mod validator;
mod value;

pub use activity::{Activity, ActivityType, ChannelAccount, InputHint, OutboundActivity, Outbox};
pub use context::{DialogContext, DialogTurnStatus, Step};
pub use dialog_set::{Dialog, DialogSet, DialogSetBuilder};
pub use engine::{BranchOnChoice, Sequential, SlotFillState, SlotFillingDialog, SlotSelector};
pub use errors::{DialogError, StructuralError};
pub use presentation::{PresentationDialog, PresentationState};
pub use prompt::{PromptDialog, PromptOptions, PromptState};
pub use recognizer::{
    resolve_number, Candidate, ChoiceRecognizer, NumberRecognizer, RecognitionResult, Recognizer,
    TextRecognizer,
};
pub use schema::{
    dialog_set_from_yaml, BranchSchema, DialogSetSchema, PresentationSchema, PromptKind,
    PromptSchema, RangeSchema, SlotSchema, SlotSetSchema,
};
pub use slot::{SlotSet, SlotSpec};
pub use stack::{DialogFrame, DialogStack, DialogState, FrameState};
pub use validator::{PromptValidator, RangeValidator};
pub use value::{FilledValue, ScalarValue, SlotValues};
