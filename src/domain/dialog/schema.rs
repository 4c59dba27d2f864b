//! Declarative dialog sets.
//!
//! A flow can be described in YAML instead of code:
//!
//! ```yaml
//! prompts:
//!   - id: text
//!     kind: text
//!   - id: shoesize
//!     kind: number
//!     retry_prompt: Please enter a size between 0 and 16.
//!     range: { min: 0, max: 16, step: 0.5 }
//! slot_sets:
//!   - id: profile
//!     slots:
//!       - { name: first, filler: text, prompt: Please enter your first name. }
//!       - { name: shoesize, filler: shoesize, prompt: Please enter your shoe size. }
//! presentations:
//!   - id: root
//!     slot_set: profile
//!     templates:
//!       first: Hello {first}.
//! ```
//!
//! Parsing only checks shape; [`DialogSetSchema::build`] runs the full
//! structural validation of [`DialogSet::builder`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DialogId, ValidationError};

use super::dialog_set::DialogSet;
use super::engine::{BranchOnChoice, SlotFillingDialog};
use super::errors::{DialogError, StructuralError};
use super::presentation::PresentationDialog;
use super::prompt::{PromptDialog, PromptOptions};
use super::slot::{SlotSet, SlotSpec};
use super::validator::RangeValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Text,
    Number,
    Choice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSchema {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSchema {
    pub id: String,
    pub kind: PromptKind,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub retry_prompt: Option<String>,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub range: Option<RangeSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSchema {
    pub name: String,
    pub filler: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub retry_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSchema {
    /// Choice slot whose value picks the branch.
    pub slot: String,
    /// Choice value to the slots visited for it.
    pub branches: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSetSchema {
    pub id: String,
    pub slots: Vec<SlotSchema>,
    #[serde(default)]
    pub branch: Option<BranchSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationSchema {
    pub id: String,
    pub slot_set: String,
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

/// Top-level YAML document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogSetSchema {
    #[serde(default)]
    pub prompts: Vec<PromptSchema>,
    #[serde(default)]
    pub slot_sets: Vec<SlotSetSchema>,
    #[serde(default)]
    pub presentations: Vec<PresentationSchema>,
}

impl DialogSetSchema {
    /// # Errors
    ///
    /// Returns `DialogError::Schema` if the document is not valid YAML or
    /// does not have the expected shape.
    pub fn from_yaml(yaml: &str) -> Result<Self, DialogError> {
        serde_yaml::from_str(yaml).map_err(|e| DialogError::Schema(e.to_string()))
    }

    /// Converts the schema into a validated dialog set.
    ///
    /// # Errors
    ///
    /// Returns `DialogError::Schema` for blank ids and
    /// `DialogError::Structural` for an invalid graph.
    pub fn build(self) -> Result<DialogSet, DialogError> {
        let mut builder = DialogSet::builder();

        for prompt in self.prompts {
            builder = builder.prompt(build_prompt(prompt)?);
        }
        for slot_set in self.slot_sets {
            builder = builder.slot_set(build_slot_set(slot_set)?);
        }
        for presentation in self.presentations {
            let mut dialog =
                PresentationDialog::new(dialog_id(&presentation.id)?, dialog_id(&presentation.slot_set)?);
            for (slot, template) in presentation.templates {
                dialog = dialog.with_template(slot, template);
            }
            builder = builder.presentation(dialog);
        }

        Ok(builder.build()?)
    }
}

/// Parses and builds a dialog set in one step.
///
/// # Errors
///
/// See [`DialogSetSchema::from_yaml`] and [`DialogSetSchema::build`].
pub fn dialog_set_from_yaml(yaml: &str) -> Result<DialogSet, DialogError> {
    DialogSetSchema::from_yaml(yaml)?.build()
}

fn dialog_id(raw: &str) -> Result<DialogId, DialogError> {
    DialogId::new(raw).map_err(|e| DialogError::Schema(e.to_string()))
}

fn invalid(dialog: &DialogId, reason: impl Into<String>) -> DialogError {
    StructuralError::InvalidDefinition {
        dialog: dialog.clone(),
        reason: reason.into(),
    }
    .into()
}

fn build_prompt(schema: PromptSchema) -> Result<PromptDialog, DialogError> {
    let id = dialog_id(&schema.id)?;

    let mut dialog = match schema.kind {
        PromptKind::Text => PromptDialog::text(id.clone()),
        PromptKind::Number => PromptDialog::number(id.clone()),
        PromptKind::Choice => {
            if schema.choices.is_empty() {
                return Err(invalid(&id, "choice prompt needs at least one choice"));
            }
            PromptDialog::choice(id.clone(), schema.choices.clone())
        }
    };
    if schema.kind != PromptKind::Choice && !schema.choices.is_empty() {
        return Err(invalid(&id, "only choice prompts take choices"));
    }

    if let Some(range) = schema.range {
        if schema.kind != PromptKind::Number {
            return Err(invalid(&id, "only number prompts take a range"));
        }
        let validator = range_validator(&range).map_err(|e| invalid(&id, e.to_string()))?;
        dialog = dialog.with_validator(Arc::new(validator));
    }

    let defaults = PromptOptions {
        prompt: schema.prompt,
        retry_prompt: schema.retry_prompt,
        choices: schema.choices,
    };
    Ok(dialog.with_defaults(defaults))
}

fn range_validator(range: &RangeSchema) -> Result<RangeValidator, ValidationError> {
    let validator = RangeValidator::new(range.min, range.max)?;
    match range.step {
        Some(step) => validator.with_step(step),
        None => Ok(validator),
    }
}

fn build_slot_set(schema: SlotSetSchema) -> Result<SlotFillingDialog, DialogError> {
    let id = dialog_id(&schema.id)?;

    let mut slots = Vec::with_capacity(schema.slots.len());
    for slot in schema.slots {
        let mut spec = SlotSpec::new(slot.name, dialog_id(&slot.filler)?);
        if slot.prompt.is_some() || slot.retry_prompt.is_some() {
            spec = spec.with_options(PromptOptions {
                prompt: slot.prompt,
                retry_prompt: slot.retry_prompt,
                choices: Vec::new(),
            });
        }
        slots.push(spec);
    }
    let slots = SlotSet::new(slots);

    let mut dialog = SlotFillingDialog::new(id.clone(), slots.clone());
    if let Some(branch) = schema.branch {
        if slots.position(&branch.slot).is_none() {
            return Err(invalid(&id, format!("branch slot '{}' is not declared", branch.slot)));
        }
        let mut selector = BranchOnChoice::new(branch.slot);
        for (value, targets) in branch.branches {
            if let Some(missing) = targets.iter().find(|t| slots.position(t).is_none()) {
                return Err(invalid(&id, format!("branch target '{}' is not declared", missing)));
            }
            selector = selector.branch(value, targets);
        }
        dialog = dialog.with_selector(Arc::new(selector));
    }

    Ok(dialog)
}
