//! Slot specifications.
//!
//! A [`SlotSet`] is the ordered list of slots a slot-filling dialog
//! collects. It is built once with the dialog set and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::DialogId;

use super::errors::StructuralError;
use super::prompt::PromptOptions;

/// One named unit of information and the dialog that fills it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub name: String,
    pub filler: DialogId,
    #[serde(default)]
    pub options: Option<PromptOptions>,
}

impl SlotSpec {
    pub fn new(name: impl Into<String>, filler: DialogId) -> Self {
        Self {
            name: name.into(),
            filler,
            options: None,
        }
    }

    /// Slot whose filler is a prompt asked with the given text.
    pub fn prompted(name: impl Into<String>, filler: DialogId, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filler,
            options: Some(PromptOptions::new(prompt)),
        }
    }

    pub fn with_options(mut self, options: PromptOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Ordered sequence of slots. Order is fill order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotSet {
    slots: Vec<SlotSpec>,
}

impl SlotSet {
    pub fn new(slots: Vec<SlotSpec>) -> Self {
        Self { slots }
    }

    pub fn get(&self, index: usize) -> Option<&SlotSpec> {
        self.slots.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotSpec> {
        self.slots.iter()
    }

    /// Checks the set is non-empty and its slot names are unique.
    pub fn validate(&self, dialog: &DialogId) -> Result<(), StructuralError> {
        if self.slots.is_empty() {
            return Err(StructuralError::EmptySlotSet(dialog.clone()));
        }

        let mut seen = HashSet::new();
        for slot in &self.slots {
            if slot.name.trim().is_empty() {
                return Err(StructuralError::InvalidDefinition {
                    dialog: dialog.clone(),
                    reason: "slot name cannot be empty".to_string(),
                });
            }
            if !seen.insert(slot.name.as_str()) {
                return Err(StructuralError::DuplicateSlot {
                    dialog: dialog.clone(),
                    slot: slot.name.clone(),
                });
            }
        }
        Ok(())
    }
}
