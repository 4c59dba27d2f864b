//! Presentation step: the two-stage flow wrapped around the engine.
//!
//! Stage 0 begins the configured slot-filling dialog. Stage 1 receives the
//! result tree and sends one summary line per top-level slot, then ends the
//! flow with the tree as its result.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::DialogId;

use super::activity::{OutboundActivity, Outbox};
use super::context::Step;
use super::value::{FilledValue, SlotValues};

/// Persisted stage of the presentation flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationState {
    pub stage: usize,
}

const COLLECTING: usize = 0;
const PRESENTED: usize = 1;

/// Root dialog of a flow: collect, then summarize.
#[derive(Debug, Clone)]
pub struct PresentationDialog {
    id: DialogId,
    slot_set: DialogId,
    templates: HashMap<String, String>,
}

impl PresentationDialog {
    pub fn new(id: DialogId, slot_set: DialogId) -> Self {
        Self {
            id,
            slot_set,
            templates: HashMap::new(),
        }
    }

    /// Summary template for a top-level slot.
    ///
    /// `{name}` placeholders resolve inside the slot's own group first,
    /// then as dotted paths from the root (`{fullname.first}`).
    pub fn with_template(mut self, slot: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(slot.into(), template.into());
        self
    }

    pub fn id(&self) -> &DialogId {
        &self.id
    }

    pub fn slot_set(&self) -> &DialogId {
        &self.slot_set
    }

    pub fn begin(&self) -> (PresentationState, Step) {
        (
            PresentationState { stage: COLLECTING },
            self.collect(),
        )
    }

    pub fn resume_after_child(
        &self,
        state: &mut PresentationState,
        result: Option<FilledValue>,
        outbox: &mut Outbox,
    ) -> Step {
        state.stage = PRESENTED;
        if let Some(FilledValue::Group(values)) = &result {
            for line in self.summarize(values) {
                outbox.send(OutboundActivity::text(line));
            }
        }
        Step::End(result)
    }

    pub fn continue_turn(&self, state: &mut PresentationState) -> Step {
        match state.stage {
            COLLECTING => self.collect(),
            _ => Step::End(None),
        }
    }

    /// One line per top-level slot, in fill order.
    pub fn summarize(&self, values: &SlotValues) -> Vec<String> {
        values
            .iter()
            .map(|(name, value)| match self.templates.get(name) {
                Some(template) => render_template(template, values, value),
                None => format!("{}: {}", name, value),
            })
            .collect()
    }

    fn collect(&self) -> Step {
        Step::BeginChild {
            dialog_id: self.slot_set.clone(),
            options: None,
        }
    }
}

fn render_template(template: &str, root: &SlotValues, field: &FilledValue) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
            break;
        };
        rendered.push_str(&rest[..open]);

        let path = &rest[open + 1..close];
        let resolved = field
            .as_group()
            .and_then(|group| group.lookup(path))
            .or_else(|| root.lookup(path));
        match resolved {
            Some(value) => rendered.push_str(&value.to_string()),
            None => rendered.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }

    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> DialogId {
        DialogId::new(name).unwrap()
    }

    fn profile() -> SlotValues {
        let mut fullname = SlotValues::new();
        fullname.insert("first", FilledValue::text("John")).unwrap();
        fullname.insert("last", FilledValue::text("Smith")).unwrap();

        let mut root = SlotValues::new();
        root.insert("fullname", FilledValue::Group(fullname)).unwrap();
        root.insert("shoesize", FilledValue::number(10.0)).unwrap();
        root
    }

    #[test]
    fn begin_collects_slot_set() {
        let dialog = PresentationDialog::new(id("root"), id("profile"));

        let (state, step) = dialog.begin();

        assert_eq!(state.stage, 0);
        assert_eq!(
            step,
            Step::BeginChild {
                dialog_id: id("profile"),
                options: None
            }
        );
    }

    #[test]
    fn resume_sends_one_line_per_top_level_slot() {
        let dialog = PresentationDialog::new(id("root"), id("profile"))
            .with_template("fullname", "Your name is {first} {last}.")
            .with_template("shoesize", "You wear a size {shoesize} shoe.");
        let (mut state, _) = dialog.begin();
        let mut outbox = Outbox::new();

        let step = dialog.resume_after_child(
            &mut state,
            Some(FilledValue::Group(profile())),
            &mut outbox,
        );

        let texts: Vec<_> = outbox.activities().iter().map(|a| a.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Your name is John Smith.", "You wear a size 10 shoe."]
        );
        assert_eq!(state.stage, 1);
        assert_eq!(step, Step::End(Some(FilledValue::Group(profile()))));
    }

    #[test]
    fn summarize_falls_back_to_generic_line() {
        let dialog = PresentationDialog::new(id("root"), id("profile"));

        let lines = dialog.summarize(&profile());

        assert_eq!(lines, vec!["fullname: John, Smith", "shoesize: 10"]);
    }

    #[test]
    fn template_resolves_root_paths_and_keeps_unknown_placeholders() {
        let rendered = render_template(
            "{fullname.last} wears {shoesize} ({missing})",
            &profile(),
            &FilledValue::number(10.0),
        );
        assert_eq!(rendered, "Smith wears 10 ({missing})");
    }

    #[test]
    fn continue_after_presenting_ends() {
        let dialog = PresentationDialog::new(id("root"), id("profile"));
        let mut state = PresentationState { stage: 1 };

        assert_eq!(dialog.continue_turn(&mut state), Step::End(None));
    }
}
