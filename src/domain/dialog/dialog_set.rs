//! Dialog registry.
//!
//! Every dialog a flow can reach is registered here by id. Stack frames
//! store only the id, so the set must be rebuilt identically on each start.
//! `build()` checks the whole graph so a structural mistake is reported
//! before any conversation begins.

use std::collections::{HashMap, HashSet};

use crate::domain::foundation::DialogId;

use super::activity::{Activity, Outbox};
use super::context::Step;
use super::engine::SlotFillingDialog;
use super::errors::{DialogError, StructuralError};
use super::presentation::PresentationDialog;
use super::prompt::{PromptDialog, PromptOptions};
use super::stack::FrameState;
use super::value::FilledValue;

/// The closed set of dialog kinds.
#[derive(Debug, Clone)]
pub enum Dialog {
    Prompt(PromptDialog),
    SlotFilling(SlotFillingDialog),
    Presentation(PresentationDialog),
}

impl Dialog {
    pub fn id(&self) -> &DialogId {
        match self {
            Dialog::Prompt(d) => d.id(),
            Dialog::SlotFilling(d) => d.id(),
            Dialog::Presentation(d) => d.id(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Dialog::Prompt(_) => "prompt",
            Dialog::SlotFilling(_) => "slot_filling",
            Dialog::Presentation(_) => "presentation",
        }
    }

    /// Starts a fresh invocation and returns its initial frame state.
    pub fn begin(
        &self,
        options: Option<PromptOptions>,
        outbox: &mut Outbox,
    ) -> Result<(FrameState, Step), DialogError> {
        match self {
            Dialog::Prompt(prompt) => {
                let (state, step) = prompt.begin(options, outbox);
                Ok((FrameState::Prompt(state), step))
            }
            Dialog::SlotFilling(engine) => {
                let (state, step) = engine.begin()?;
                Ok((FrameState::SlotFilling(state), step))
            }
            Dialog::Presentation(presentation) => {
                let (state, step) = presentation.begin();
                Ok((FrameState::Presentation(state), step))
            }
        }
    }

    /// Handles a turn that reached this dialog as the innermost frame.
    pub fn continue_turn(
        &self,
        state: &mut FrameState,
        activity: &Activity,
        locale: &str,
        outbox: &mut Outbox,
    ) -> Result<Step, DialogError> {
        match (self, state) {
            (Dialog::Prompt(prompt), FrameState::Prompt(state)) => {
                Ok(prompt.continue_turn(state, activity, locale, outbox))
            }
            (Dialog::SlotFilling(engine), FrameState::SlotFilling(state)) => {
                Ok(engine.continue_turn(state))
            }
            (Dialog::Presentation(presentation), FrameState::Presentation(state)) => {
                Ok(presentation.continue_turn(state))
            }
            _ => Err(self.mismatch()),
        }
    }

    /// Receives the result of a child that just ended.
    pub fn resume_after_child(
        &self,
        state: &mut FrameState,
        result: Option<FilledValue>,
        outbox: &mut Outbox,
    ) -> Result<Step, DialogError> {
        match (self, state) {
            (Dialog::SlotFilling(engine), FrameState::SlotFilling(state)) => {
                engine.resume_after_child(state, result)
            }
            (Dialog::Presentation(presentation), FrameState::Presentation(state)) => {
                Ok(presentation.resume_after_child(state, result, outbox))
            }
            // Prompts never begin children.
            _ => Err(self.mismatch()),
        }
    }

    /// Called when the frame is discarded by a cancel. Nothing is sent.
    pub fn on_cancel(&self, state: &FrameState) {
        match state {
            FrameState::Prompt(prompt) => {
                tracing::debug!(dialog = %self.id(), attempts = prompt.attempts, "Prompt cancelled")
            }
            FrameState::SlotFilling(fill) => {
                tracing::debug!(dialog = %self.id(), filled = fill.values.len(), "Slot set cancelled")
            }
            FrameState::Presentation(_) => {
                tracing::debug!(dialog = %self.id(), "Presentation cancelled")
            }
        }
    }

    fn mismatch(&self) -> DialogError {
        DialogError::FrameMismatch {
            dialog: self.id().clone(),
        }
    }
}

/// Validated collection of dialogs.
#[derive(Debug, Clone, Default)]
pub struct DialogSet {
    dialogs: HashMap<DialogId, Dialog>,
}

impl DialogSet {
    pub fn builder() -> DialogSetBuilder {
        DialogSetBuilder::default()
    }

    /// # Errors
    ///
    /// Returns `UnknownDialog` if no dialog has this id.
    pub fn get(&self, id: &DialogId) -> Result<&Dialog, StructuralError> {
        self.dialogs
            .get(id)
            .ok_or_else(|| StructuralError::UnknownDialog(id.clone()))
    }

    pub fn contains(&self, id: &DialogId) -> bool {
        self.dialogs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DialogSetBuilder {
    dialogs: Vec<Dialog>,
}

impl DialogSetBuilder {
    pub fn add(mut self, dialog: Dialog) -> Self {
        self.dialogs.push(dialog);
        self
    }

    pub fn prompt(self, dialog: PromptDialog) -> Self {
        self.add(Dialog::Prompt(dialog))
    }

    pub fn slot_set(self, dialog: SlotFillingDialog) -> Self {
        self.add(Dialog::SlotFilling(dialog))
    }

    pub fn presentation(self, dialog: PresentationDialog) -> Self {
        self.add(Dialog::Presentation(dialog))
    }

    /// Validates the dialog graph.
    ///
    /// # Errors
    ///
    /// - `DuplicateDialog` if two dialogs share an id
    /// - `EmptySlotSet` / `DuplicateSlot` for malformed slot sets
    /// - `UnknownDialog` if a filler or presentation target is undefined
    /// - `NotASlotSet` if a presentation targets something else
    /// - `InvalidDefinition` if a slot is filled by a presentation
    /// - `CyclicSlotSet` if a slot set contains itself
    pub fn build(self) -> Result<DialogSet, StructuralError> {
        let mut dialogs = HashMap::with_capacity(self.dialogs.len());
        for dialog in self.dialogs {
            let id = dialog.id().clone();
            if dialogs.insert(id.clone(), dialog).is_some() {
                return Err(StructuralError::DuplicateDialog(id));
            }
        }

        let set = DialogSet { dialogs };
        for dialog in set.dialogs.values() {
            match dialog {
                Dialog::Prompt(_) => {}
                Dialog::SlotFilling(engine) => validate_slot_set(&set, engine)?,
                Dialog::Presentation(presentation) => {
                    match set.get(presentation.slot_set())? {
                        Dialog::SlotFilling(_) => {}
                        _ => {
                            return Err(StructuralError::NotASlotSet {
                                dialog: presentation.id().clone(),
                                target: presentation.slot_set().clone(),
                            })
                        }
                    }
                }
            }
        }

        let mut finished = HashSet::new();
        for dialog in set.dialogs.values() {
            if let Dialog::SlotFilling(engine) = dialog {
                detect_cycle(&set, engine.id(), &mut Vec::new(), &mut finished)?;
            }
        }

        Ok(set)
    }
}

fn validate_slot_set(set: &DialogSet, engine: &SlotFillingDialog) -> Result<(), StructuralError> {
    engine.slots().validate(engine.id())?;
    for slot in engine.slots().iter() {
        if let Dialog::Presentation(_) = set.get(&slot.filler)? {
            return Err(StructuralError::InvalidDefinition {
                dialog: engine.id().clone(),
                reason: format!("slot '{}' cannot be filled by a presentation", slot.name),
            });
        }
    }
    Ok(())
}

fn detect_cycle(
    set: &DialogSet,
    id: &DialogId,
    path: &mut Vec<DialogId>,
    finished: &mut HashSet<DialogId>,
) -> Result<(), StructuralError> {
    if finished.contains(id) {
        return Ok(());
    }
    if path.contains(id) {
        return Err(StructuralError::CyclicSlotSet(id.clone()));
    }

    path.push(id.clone());
    if let Dialog::SlotFilling(engine) = set.get(id)? {
        for slot in engine.slots().iter() {
            if let Dialog::SlotFilling(_) = set.get(&slot.filler)? {
                detect_cycle(set, &slot.filler, path, finished)?;
            }
        }
    }
    path.pop();
    finished.insert(id.clone());
    Ok(())
}
