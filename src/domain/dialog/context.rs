//! Dialog driver.
//!
//! A [`DialogContext`] drives the dialogs of one conversation for one turn.
//! Dialogs never call each other: they return a [`Step`] and the context
//! applies it to the stack, looping until some dialog waits for input or
//! the outermost dialog ends. Nesting depth therefore costs heap frames on
//! the [`DialogStack`], not call-stack frames.

use crate::domain::foundation::DialogId;

use super::activity::{Activity, Outbox};
use super::dialog_set::DialogSet;
use super::errors::DialogError;
use super::prompt::PromptOptions;
use super::stack::{DialogFrame, DialogStack};
use super::value::FilledValue;

/// What a dialog asks the driver to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Suspend until the next user turn.
    Wait,
    /// Push and begin a child dialog.
    BeginChild {
        dialog_id: DialogId,
        options: Option<PromptOptions>,
    },
    /// Pop this dialog and hand the result to its parent.
    End(Option<FilledValue>),
}

/// Outcome of driving the stack for one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogTurnStatus {
    /// No dialog was active.
    Empty,
    /// A dialog is waiting for input.
    Waiting,
    /// The outermost dialog ended with this result.
    Complete(Option<FilledValue>),
    /// The stack was cleared by a cancel.
    Cancelled,
}

pub struct DialogContext<'a> {
    dialogs: &'a DialogSet,
    stack: &'a mut DialogStack,
    default_locale: &'a str,
}

impl<'a> DialogContext<'a> {
    pub fn new(dialogs: &'a DialogSet, stack: &'a mut DialogStack, default_locale: &'a str) -> Self {
        Self {
            dialogs,
            stack,
            default_locale,
        }
    }

    /// Innermost suspended dialog, if any.
    pub fn active_dialog(&self) -> Option<&DialogFrame> {
        self.stack.top()
    }

    /// Pushes `dialog_id` on top of the stack and runs until it waits or ends.
    ///
    /// # Errors
    ///
    /// Returns a structural error if the dialog (or a filler it reaches) is
    /// not registered.
    pub fn begin_dialog(
        &mut self,
        dialog_id: &DialogId,
        options: Option<PromptOptions>,
        outbox: &mut Outbox,
    ) -> Result<DialogTurnStatus, DialogError> {
        tracing::debug!(dialog = %dialog_id, depth = self.stack.len(), "Beginning dialog");
        self.run(
            Step::BeginChild {
                dialog_id: dialog_id.clone(),
                options,
            },
            outbox,
        )
    }

    /// Routes the activity to the innermost dialog.
    ///
    /// Returns [`DialogTurnStatus::Empty`] without side effects when nothing
    /// is active.
    pub fn continue_dialog(
        &mut self,
        activity: &Activity,
        outbox: &mut Outbox,
    ) -> Result<DialogTurnStatus, DialogError> {
        let dialogs = self.dialogs;
        let locale = activity.locale.as_deref().unwrap_or(self.default_locale);

        let Some(frame) = self.stack.top_mut() else {
            return Ok(DialogTurnStatus::Empty);
        };
        let dialog = dialogs.get(&frame.dialog_id)?;
        let step = dialog.continue_turn(&mut frame.state, activity, locale, outbox)?;

        self.run(step, outbox)
    }

    /// Discards every suspended dialog.
    pub fn cancel_all_dialogs(&mut self) -> DialogTurnStatus {
        if self.stack.is_empty() {
            return DialogTurnStatus::Empty;
        }
        tracing::debug!(depth = self.stack.len(), "Cancelling all dialogs");
        while let Some(frame) = self.stack.pop() {
            if let Ok(dialog) = self.dialogs.get(&frame.dialog_id) {
                dialog.on_cancel(&frame.state);
            }
        }
        DialogTurnStatus::Cancelled
    }

    fn run(&mut self, mut step: Step, outbox: &mut Outbox) -> Result<DialogTurnStatus, DialogError> {
        let dialogs = self.dialogs;
        loop {
            step = match step {
                Step::Wait => return Ok(DialogTurnStatus::Waiting),
                Step::BeginChild { dialog_id, options } => {
                    let dialog = dialogs.get(&dialog_id)?;
                    let (state, next) = dialog.begin(options, outbox)?;
                    self.stack.push(DialogFrame { dialog_id, state });
                    next
                }
                Step::End(result) => {
                    self.stack.pop();
                    let Some(parent) = self.stack.top_mut() else {
                        return Ok(DialogTurnStatus::Complete(result));
                    };
                    let dialog = dialogs.get(&parent.dialog_id)?;
                    dialog.resume_after_child(&mut parent.state, result, outbox)?
                }
            };
        }
    }
}
