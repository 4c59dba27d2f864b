//! Slot-filling engine.
//!
//! Collects every slot of a [`SlotSet`] in turn. For each slot the engine
//! asks the driver to begin the slot's filler (a prompt or another
//! slot-filling dialog) and waits for it to end. The child's result is
//! stored under the slot name, the cursor advances, and the next filler is
//! begun. Once no slot remains the engine ends with all values as a group.
//!
//! Invalid input never reaches the engine: the active prompt retries on its
//! own, so `next_index` and stored values only change on child success.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::DialogId;

use super::context::Step;
use super::errors::{DialogError, StructuralError};
use super::slot::SlotSet;
use super::value::{FilledValue, SlotValues};

/// Persisted state of one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotFillState {
    pub values: SlotValues,
    /// Cursor into the slot set; equals its length once done.
    pub next_index: usize,
}

/// Chooses which slot to fill next. The extension point for branching.
pub trait SlotSelector: Send + Sync + fmt::Debug {
    /// Index of the next slot to fill at or after `from`, `None` when done.
    fn select(&self, slots: &SlotSet, values: &SlotValues, from: usize) -> Option<usize>;
}

/// Visits every slot in declared order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl SlotSelector for Sequential {
    fn select(&self, slots: &SlotSet, _values: &SlotValues, from: usize) -> Option<usize> {
        (from < slots.len()).then_some(from)
    }
}

/// Visits the slots listed for the value picked in a choice slot and skips
/// the slots listed only for other values. Unlisted slots are always visited.
#[derive(Debug, Clone, Default)]
pub struct BranchOnChoice {
    slot: String,
    branches: HashMap<String, Vec<String>>,
}

impl BranchOnChoice {
    pub fn new(slot: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            branches: HashMap::new(),
        }
    }

    /// Slots to visit when the choice slot holds `value`.
    pub fn branch<I, S>(mut self, value: impl Into<String>, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches
            .insert(value.into(), slots.into_iter().map(Into::into).collect());
        self
    }

    fn is_branch_target(&self, name: &str) -> bool {
        self.branches
            .values()
            .any(|targets| targets.iter().any(|t| t == name))
    }

    fn is_selected(&self, name: &str, values: &SlotValues) -> bool {
        values
            .get(&self.slot)
            .and_then(FilledValue::as_scalar)
            .and_then(|scalar| scalar.as_text())
            .and_then(|chosen| self.branches.get(chosen))
            .is_some_and(|targets| targets.iter().any(|t| t == name))
    }
}

impl SlotSelector for BranchOnChoice {
    fn select(&self, slots: &SlotSet, values: &SlotValues, from: usize) -> Option<usize> {
        (from..slots.len()).find(|&index| {
            slots.get(index).is_some_and(|spec| {
                !self.is_branch_target(&spec.name) || self.is_selected(&spec.name, values)
            })
        })
    }
}

/// Dialog that fills an ordered slot set.
#[derive(Debug, Clone)]
pub struct SlotFillingDialog {
    id: DialogId,
    slots: SlotSet,
    selector: Arc<dyn SlotSelector>,
}

impl SlotFillingDialog {
    pub fn new(id: DialogId, slots: SlotSet) -> Self {
        Self {
            id,
            slots,
            selector: Arc::new(Sequential),
        }
    }

    pub fn with_selector(mut self, selector: Arc<dyn SlotSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn id(&self) -> &DialogId {
        &self.id
    }

    pub fn slots(&self) -> &SlotSet {
        &self.slots
    }

    /// Starts with empty values and delegates to the first slot's filler.
    ///
    /// # Errors
    ///
    /// Returns `EmptySlotSet` if there is nothing to collect.
    pub fn begin(&self) -> Result<(SlotFillState, Step), DialogError> {
        if self.slots.is_empty() {
            return Err(StructuralError::EmptySlotSet(self.id.clone()).into());
        }
        let mut state = SlotFillState::default();
        let step = self.delegate(&mut state, 0);
        Ok((state, step))
    }

    /// Stores the finished child's value and moves to the next slot.
    pub fn resume_after_child(
        &self,
        state: &mut SlotFillState,
        result: Option<FilledValue>,
    ) -> Result<Step, DialogError> {
        let spec = self
            .slots
            .get(state.next_index)
            .ok_or_else(|| DialogError::FrameMismatch {
                dialog: self.id.clone(),
            })?;

        if let Some(value) = result {
            state
                .values
                .insert(spec.name.clone(), value)
                .map_err(|source| DialogError::SlotOverwrite {
                    slot: spec.name.clone(),
                    source,
                })?;
            tracing::debug!(dialog = %self.id, slot = %spec.name, "Slot filled");
        }

        let from = state.next_index + 1;
        Ok(self.delegate(state, from))
    }

    /// Input reached the engine itself; restart the current slot's filler.
    pub fn continue_turn(&self, state: &mut SlotFillState) -> Step {
        let from = state.next_index;
        self.delegate(state, from)
    }

    fn delegate(&self, state: &mut SlotFillState, from: usize) -> Step {
        let next = self
            .selector
            .select(&self.slots, &state.values, from)
            .and_then(|index| self.slots.get(index).map(|spec| (index, spec)));

        match next {
            Some((index, spec)) => {
                state.next_index = index;
                Step::BeginChild {
                    dialog_id: spec.filler.clone(),
                    options: spec.options.clone(),
                }
            }
            None => self.finish(state),
        }
    }

    fn finish(&self, state: &mut SlotFillState) -> Step {
        state.next_index = self.slots.len();
        tracing::debug!(dialog = %self.id, filled = state.values.len(), "Slot set complete");
        Step::End(Some(FilledValue::Group(state.values.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialog::slot::SlotSpec;
    use crate::domain::dialog::value::ScalarValue;

    fn id(name: &str) -> DialogId {
        DialogId::new(name).unwrap()
    }

    fn address() -> SlotFillingDialog {
        SlotFillingDialog::new(
            id("address"),
            SlotSet::new(vec![
                SlotSpec::prompted("street", id("text"), "Street?"),
                SlotSpec::prompted("city", id("text"), "City?"),
                SlotSpec::prompted("zip", id("text"), "Zip?"),
            ]),
        )
    }

    #[test]
    fn begin_delegates_to_first_slot() {
        let (state, step) = address().begin().unwrap();

        assert_eq!(state.next_index, 0);
        assert!(state.values.is_empty());
        assert!(matches!(step, Step::BeginChild { dialog_id, options }
            if dialog_id == id("text")
                && options.as_ref().and_then(|o| o.prompt.as_deref()) == Some("Street?")));
    }

    #[test]
    fn begin_fails_on_empty_slot_set() {
        let engine = SlotFillingDialog::new(id("empty"), SlotSet::new(vec![]));

        let err = engine.begin().unwrap_err();

        assert_eq!(
            err,
            DialogError::Structural(StructuralError::EmptySlotSet(id("empty")))
        );
    }

    #[test]
    fn resume_stores_value_and_advances() {
        let engine = address();
        let (mut state, _) = engine.begin().unwrap();

        let step = engine
            .resume_after_child(&mut state, Some(FilledValue::text("1 Main St")))
            .unwrap();

        assert_eq!(state.next_index, 1);
        assert_eq!(state.values.get("street"), Some(&FilledValue::text("1 Main St")));
        assert!(matches!(step, Step::BeginChild { .. }));
    }

    #[test]
    fn last_resume_ends_with_group() {
        let engine = address();
        let (mut state, _) = engine.begin().unwrap();

        for value in ["1 Main St", "Springfield"] {
            engine
                .resume_after_child(&mut state, Some(FilledValue::text(value)))
                .unwrap();
        }
        let step = engine
            .resume_after_child(&mut state, Some(FilledValue::text("12345")))
            .unwrap();

        assert_eq!(state.next_index, 3);
        match step {
            Step::End(Some(FilledValue::Group(values))) => {
                assert_eq!(values.names().collect::<Vec<_>>(), vec!["street", "city", "zip"]);
            }
            other => panic!("expected end with group, got {:?}", other),
        }
    }

    #[test]
    fn continue_turn_restarts_current_slot() {
        let engine = address();
        let (mut state, _) = engine.begin().unwrap();
        engine
            .resume_after_child(&mut state, Some(FilledValue::text("1 Main St")))
            .unwrap();

        let step = engine.continue_turn(&mut state);

        assert_eq!(state.next_index, 1);
        assert!(matches!(step, Step::BeginChild { options, .. }
            if options.as_ref().and_then(|o| o.prompt.as_deref()) == Some("City?")));
    }

    #[test]
    fn resume_with_corrupt_cursor_is_frame_mismatch() {
        let engine = address();
        let mut state = SlotFillState {
            values: SlotValues::new(),
            next_index: 7,
        };

        let err = engine
            .resume_after_child(&mut state, Some(FilledValue::text("x")))
            .unwrap_err();

        assert!(matches!(err, DialogError::FrameMismatch { .. }));
    }

    #[test]
    fn branch_on_choice_skips_other_branches() {
        let slots = SlotSet::new(vec![
            SlotSpec::new("level1", id("level1")),
            SlotSpec::new("repair_item", id("text")),
            SlotSpec::new("claim_number", id("text")),
            SlotSpec::new("comment", id("text")),
        ]);
        let selector = BranchOnChoice::new("level1")
            .branch("Réparation", ["repair_item"])
            .branch("Déclaration", ["claim_number"]);

        let mut values = SlotValues::new();
        values
            .insert(
                "level1",
                FilledValue::Scalar(ScalarValue::Choice {
                    value: "Déclaration".to_string(),
                    index: 1,
                }),
            )
            .unwrap();

        assert_eq!(selector.select(&slots, &values, 1), Some(2));
        assert_eq!(selector.select(&slots, &values, 3), Some(3));
        assert_eq!(selector.select(&slots, &values, 4), None);
    }

    #[test]
    fn sequential_stops_at_end() {
        let slots = address().slots().clone();
        assert_eq!(Sequential.select(&slots, &SlotValues::new(), 2), Some(2));
        assert_eq!(Sequential.select(&slots, &SlotValues::new(), 3), None);
    }
}
