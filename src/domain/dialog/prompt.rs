//! Prompt dialog: asks for one scalar slot.
//!
//! On begin the question is rendered and the prompt waits. Each reply is
//! run through the recognizer and the optional validator. Success ends the
//! prompt with the recognized value; failure re-renders the retry prompt
//! (or the question) and waits again, without any retry limit.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::foundation::DialogId;

use super::activity::{Activity, OutboundActivity, Outbox};
use super::context::Step;
use super::recognizer::{ChoiceRecognizer, NumberRecognizer, Recognizer, TextRecognizer};
use super::validator::PromptValidator;
use super::value::FilledValue;

/// Text and choices a prompt renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOptions {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub retry_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl PromptOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn with_retry_prompt(mut self, retry_prompt: impl Into<String>) -> Self {
        self.retry_prompt = Some(retry_prompt.into());
        self
    }

    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    /// Fields set in `overrides` win over `self`.
    fn merged_with(&self, overrides: Option<PromptOptions>) -> PromptOptions {
        match overrides {
            None => self.clone(),
            Some(o) => PromptOptions {
                prompt: o.prompt.or_else(|| self.prompt.clone()),
                retry_prompt: o.retry_prompt.or_else(|| self.retry_prompt.clone()),
                choices: if o.choices.is_empty() {
                    self.choices.clone()
                } else {
                    o.choices
                },
            },
        }
    }
}

/// Persisted state of a waiting prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptState {
    pub options: PromptOptions,
    /// Failed replies so far.
    pub attempts: u32,
}

/// Dialog that fills a scalar slot.
#[derive(Debug, Clone)]
pub struct PromptDialog {
    id: DialogId,
    recognizer: Arc<dyn Recognizer>,
    validator: Option<Arc<dyn PromptValidator>>,
    defaults: PromptOptions,
}

impl PromptDialog {
    pub fn new(id: DialogId, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            id,
            recognizer,
            validator: None,
            defaults: PromptOptions::default(),
        }
    }

    pub fn text(id: DialogId) -> Self {
        Self::new(id, Arc::new(TextRecognizer))
    }

    pub fn number(id: DialogId) -> Self {
        Self::new(id, Arc::new(NumberRecognizer))
    }

    /// Choice prompt; the choices are also offered as suggested actions.
    pub fn choice(id: DialogId, choices: Vec<String>) -> Self {
        let mut dialog = Self::new(id, Arc::new(ChoiceRecognizer::new(choices.clone())));
        dialog.defaults.choices = choices;
        dialog
    }

    pub fn with_validator(mut self, validator: Arc<dyn PromptValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Options used when a slot does not supply its own.
    pub fn with_defaults(mut self, defaults: PromptOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn id(&self) -> &DialogId {
        &self.id
    }

    pub fn begin(&self, options: Option<PromptOptions>, outbox: &mut Outbox) -> (PromptState, Step) {
        let state = PromptState {
            options: self.defaults.merged_with(options),
            attempts: 0,
        };
        self.render(&state, false, outbox);
        (state, Step::Wait)
    }

    pub fn continue_turn(
        &self,
        state: &mut PromptState,
        activity: &Activity,
        locale: &str,
        outbox: &mut Outbox,
    ) -> Step {
        let recognized = self
            .recognizer
            .recognize_value(activity.text_or_empty(), locale);

        let accepted = match &self.validator {
            Some(validator) => validator.validate(&recognized),
            None => recognized.succeeded(),
        };

        match recognized.value {
            Some(value) if accepted => Step::End(Some(FilledValue::Scalar(value))),
            _ => {
                state.attempts += 1;
                tracing::debug!(
                    dialog = %self.id,
                    attempts = state.attempts,
                    "Input not recognized, re-prompting"
                );
                self.render(state, true, outbox);
                Step::Wait
            }
        }
    }

    fn render(&self, state: &PromptState, is_retry: bool, outbox: &mut Outbox) {
        let text = match (&state.options.retry_prompt, &state.options.prompt) {
            (Some(retry), _) if is_retry => retry,
            (_, Some(prompt)) => prompt,
            _ => return,
        };
        outbox.send(
            OutboundActivity::prompt(text.clone())
                .with_suggested_actions(state.options.choices.clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialog::validator::RangeValidator;
    use crate::domain::dialog::value::ScalarValue;

    fn id(name: &str) -> DialogId {
        DialogId::new(name).unwrap()
    }

    fn shoe_prompt() -> PromptDialog {
        PromptDialog::number(id("shoesize"))
            .with_validator(Arc::new(RangeValidator::shoe_size()))
            .with_defaults(
                PromptOptions::new("Please enter your shoe size.")
                    .with_retry_prompt("Please enter a size between 0 and 16."),
            )
    }

    #[test]
    fn begin_renders_prompt_and_waits() {
        let mut outbox = Outbox::new();

        let (state, step) = shoe_prompt().begin(None, &mut outbox);

        assert_eq!(step, Step::Wait);
        assert_eq!(state.attempts, 0);
        assert_eq!(outbox.activities()[0].text, "Please enter your shoe size.");
    }

    #[test]
    fn slot_options_override_defaults() {
        let mut outbox = Outbox::new();

        let (state, _) =
            shoe_prompt().begin(Some(PromptOptions::new("Shoe size?")), &mut outbox);

        assert_eq!(outbox.activities()[0].text, "Shoe size?");
        assert_eq!(
            state.options.retry_prompt.as_deref(),
            Some("Please enter a size between 0 and 16.")
        );
    }

    #[test]
    fn valid_reply_ends_with_value() {
        let prompt = shoe_prompt();
        let mut outbox = Outbox::new();
        let (mut state, _) = prompt.begin(None, &mut outbox);

        let step = prompt.continue_turn(&mut state, &Activity::message("8.5"), "en-us", &mut outbox);

        assert_eq!(step, Step::End(Some(FilledValue::number(8.5))));
    }

    #[test]
    fn rejected_reply_renders_retry_prompt() {
        let prompt = shoe_prompt();
        let mut outbox = Outbox::new();
        let (mut state, _) = prompt.begin(None, &mut outbox);

        let step = prompt.continue_turn(&mut state, &Activity::message("16.1"), "en-us", &mut outbox);

        assert_eq!(step, Step::Wait);
        assert_eq!(state.attempts, 1);
        assert_eq!(
            outbox.activities()[1].text,
            "Please enter a size between 0 and 16."
        );
    }

    #[test]
    fn retry_without_retry_prompt_repeats_question() {
        let prompt = PromptDialog::text(id("first"));
        let mut outbox = Outbox::new();
        let (mut state, _) = prompt.begin(Some(PromptOptions::new("First name?")), &mut outbox);

        prompt.continue_turn(&mut state, &Activity::message("   "), "en-us", &mut outbox);

        assert_eq!(outbox.activities().len(), 2);
        assert_eq!(outbox.activities()[1].text, "First name?");
    }

    #[test]
    fn locale_changes_recognition() {
        let prompt = PromptDialog::number(id("amount"));
        let mut outbox = Outbox::new();
        let (mut state, _) = prompt.begin(None, &mut outbox);

        let step = prompt.continue_turn(&mut state, &Activity::message("2,5"), "fr-fr", &mut outbox);

        assert_eq!(step, Step::End(Some(FilledValue::number(2.5))));
    }

    #[test]
    fn choice_prompt_offers_suggested_actions() {
        let prompt = PromptDialog::choice(
            id("level1"),
            vec!["Assistance".to_string(), "Autres".to_string()],
        );
        let mut outbox = Outbox::new();

        let (mut state, _) = prompt.begin(Some(PromptOptions::new("Domain")), &mut outbox);
        let step = prompt.continue_turn(&mut state, &Activity::message("autres"), "fr-fr", &mut outbox);

        assert_eq!(
            outbox.activities()[0].suggested_actions,
            vec!["Assistance".to_string(), "Autres".to_string()]
        );
        assert_eq!(
            step,
            Step::End(Some(FilledValue::Scalar(ScalarValue::Choice {
                value: "Autres".to_string(),
                index: 1
            })))
        );
    }
}
