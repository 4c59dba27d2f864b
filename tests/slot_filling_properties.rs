//! Property tests for the slot-filling engine.
//!
//! Drives generated flat and nested slot sets through a DialogContext
//! directly, without the dispatcher or a store.

use proptest::prelude::*;

use slot_filler::domain::dialog::{
    Activity, DialogContext, DialogSet, DialogStack, DialogTurnStatus, FilledValue, FrameState,
    Outbox, PromptDialog, RangeValidator, SlotFillingDialog, SlotSet, SlotSpec,
};
use slot_filler::domain::foundation::DialogId;
use std::sync::Arc;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn id(name: &str) -> DialogId {
    DialogId::new(name).unwrap()
}

fn slot_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("slot{}", i)).collect()
}

/// One slot set `form` of `count` text slots, followed by a `size` slot
/// validated as a shoe size.
fn flat_flow(count: usize) -> DialogSet {
    let mut slots: Vec<SlotSpec> = slot_names(count)
        .into_iter()
        .map(|name| SlotSpec::prompted(name.clone(), id("text"), format!("{}?", name)))
        .collect();
    slots.push(SlotSpec::prompted("size", id("size"), "Size?"));

    DialogSet::builder()
        .prompt(PromptDialog::text(id("text")))
        .prompt(
            PromptDialog::number(id("size")).with_validator(Arc::new(RangeValidator::shoe_size())),
        )
        .slot_set(SlotFillingDialog::new(id("form"), SlotSet::new(slots)))
        .build()
        .unwrap()
}

/// `outer` holds `groups` copies of a two-slot `pair` set.
fn nested_flow(groups: usize) -> DialogSet {
    let pair = SlotSet::new(vec![
        SlotSpec::prompted("a", id("text"), "A?"),
        SlotSpec::prompted("b", id("text"), "B?"),
    ]);
    let outer = SlotSet::new(
        (0..groups)
            .map(|i| SlotSpec::new(format!("group{}", i), id("pair")))
            .collect(),
    );

    DialogSet::builder()
        .prompt(PromptDialog::text(id("text")))
        .slot_set(SlotFillingDialog::new(id("pair"), pair))
        .slot_set(SlotFillingDialog::new(id("outer"), outer))
        .build()
        .unwrap()
}

fn reply(
    dialogs: &DialogSet,
    stack: &mut DialogStack,
    text: &str,
) -> DialogTurnStatus {
    let mut outbox = Outbox::new();
    DialogContext::new(dialogs, stack, "en-us")
        .continue_dialog(&Activity::message(text), &mut outbox)
        .unwrap()
}

fn form_state(stack: &DialogStack) -> (usize, Vec<String>) {
    match &stack.get(0).unwrap().state {
        FrameState::SlotFilling(fill) => (
            fill.next_index,
            fill.values.names().map(str::to_string).collect(),
        ),
        other => panic!("unexpected frame {:?}", other),
    }
}

fn out_of_range_size() -> impl Strategy<Value = String> {
    prop_oneof![
        (16.5f64..1000.0).prop_map(|n| format!("{}", n)),
        (1u32..1000).prop_map(|n| format!("-{}", n)),
        "[a-z]{1,8}".prop_filter("no number words", |s| {
            !["one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
              "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "zero"]
                .contains(&s.as_str())
        }),
    ]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn filling_every_slot_yields_names_in_declaration_order(count in 1usize..8) {
        let dialogs = flat_flow(count);
        let mut stack = DialogStack::new();
        let mut outbox = Outbox::new();
        DialogContext::new(&dialogs, &mut stack, "en-us")
            .begin_dialog(&id("form"), None, &mut outbox)
            .unwrap();

        for i in 0..count {
            let status = reply(&dialogs, &mut stack, &format!("value {}", i));
            prop_assert_eq!(status, DialogTurnStatus::Waiting);
        }
        let status = reply(&dialogs, &mut stack, "9.5");

        let values = match status {
            DialogTurnStatus::Complete(Some(FilledValue::Group(values))) => values,
            other => return Err(TestCaseError::fail(format!("not complete: {:?}", other))),
        };
        let mut expected = slot_names(count);
        expected.push("size".to_string());
        prop_assert_eq!(values.names().map(str::to_string).collect::<Vec<_>>(), expected);
        prop_assert_eq!(values.get("size"), Some(&FilledValue::number(9.5)));
        prop_assert!(stack.is_empty());
    }

    #[test]
    fn rejected_input_never_changes_collected_values(
        count in 0usize..5,
        rejects in proptest::collection::vec(out_of_range_size(), 1..6),
    ) {
        let dialogs = flat_flow(count);
        let mut stack = DialogStack::new();
        let mut outbox = Outbox::new();
        DialogContext::new(&dialogs, &mut stack, "en-us")
            .begin_dialog(&id("form"), None, &mut outbox)
            .unwrap();
        for i in 0..count {
            reply(&dialogs, &mut stack, &format!("value {}", i));
        }
        let before = form_state(&stack);

        for text in &rejects {
            let status = reply(&dialogs, &mut stack, text);
            prop_assert_eq!(status, DialogTurnStatus::Waiting);
            prop_assert_eq!(form_state(&stack), before.clone());
            prop_assert_eq!(stack.len(), 2);
        }

        match &stack.top().unwrap().state {
            FrameState::Prompt(prompt) => prop_assert_eq!(prompt.attempts as usize, rejects.len()),
            other => return Err(TestCaseError::fail(format!("unexpected frame {:?}", other))),
        }
    }

    #[test]
    fn nested_sets_produce_one_entry_per_outer_slot(groups in 1usize..5) {
        let dialogs = nested_flow(groups);
        let mut stack = DialogStack::new();
        let mut outbox = Outbox::new();
        DialogContext::new(&dialogs, &mut stack, "en-us")
            .begin_dialog(&id("outer"), None, &mut outbox)
            .unwrap();

        let mut status = DialogTurnStatus::Waiting;
        for i in 0..groups * 2 {
            status = reply(&dialogs, &mut stack, &format!("answer {}", i));
        }

        let values = match status {
            DialogTurnStatus::Complete(Some(FilledValue::Group(values))) => values,
            other => return Err(TestCaseError::fail(format!("not complete: {:?}", other))),
        };
        prop_assert_eq!(values.len(), groups);
        for i in 0..groups {
            let group = values.get(&format!("group{}", i)).and_then(FilledValue::as_group);
            prop_assert_eq!(group.map(|g| g.len()), Some(2));
        }
    }

    #[test]
    fn half_steps_within_range_are_accepted(halves in 0u32..=32) {
        let size = f64::from(halves) / 2.0;
        prop_assert!(RangeValidator::shoe_size().accepts(size));
    }

    #[test]
    fn off_step_sizes_are_rejected(whole in 0u32..16, frac in 0.01f64..0.49) {
        prop_assert!(!RangeValidator::shoe_size().accepts(f64::from(whole) + frac));
        prop_assert!(!RangeValidator::shoe_size().accepts(f64::from(whole) + 0.5 + frac));
    }

    #[test]
    fn sizes_outside_bounds_are_rejected(over in 16.01f64..1e6, under in -1e6f64..-0.01) {
        prop_assert!(!RangeValidator::shoe_size().accepts(over));
        prop_assert!(!RangeValidator::shoe_size().accepts(under));
    }
}
