//! Dialog stack and the persisted per-conversation state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DialogId;

use super::engine::SlotFillState;
use super::errors::DialogError;
use super::presentation::PresentationState;
use super::prompt::PromptState;

/// Private state of one suspended dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameState {
    Prompt(PromptState),
    SlotFilling(SlotFillState),
    Presentation(PresentationState),
}

/// One suspended dialog on the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogFrame {
    pub dialog_id: DialogId,
    pub state: FrameState,
}

/// Suspended dialogs, innermost last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogStack {
    frames: Vec<DialogFrame>,
}

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: DialogFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<DialogFrame> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&DialogFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut DialogFrame> {
        self.frames.last_mut()
    }

    /// Frame at `index`, counted from the bottom.
    pub fn get(&self, index: usize) -> Option<&DialogFrame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DialogFrame> {
        self.frames.iter()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Everything persisted for one conversation between turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogState {
    pub stack: DialogStack,
    pub turn_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl DialogState {
    pub fn new() -> Self {
        Self {
            stack: DialogStack::new(),
            turn_count: 0,
            updated_at: Utc::now(),
        }
    }

    /// True while a flow is in progress.
    pub fn is_active(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Marks the end of a processed turn.
    pub fn record_turn(&mut self) {
        self.turn_count += 1;
        self.updated_at = Utc::now();
    }

    pub fn to_json(&self) -> Result<String, DialogError> {
        serde_json::to_string(self).map_err(|e| DialogError::Serialization(e.to_string()))
    }

    pub fn from_json(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }
}

impl Default for DialogState {
    fn default() -> Self {
        Self::new()
    }
}
