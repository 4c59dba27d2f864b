//! TurnDispatcher - Route one inbound activity through the dialog stack
//!
//! One call handles one turn of one conversation:
//! load state, run the dialogs, persist state exactly once, return the
//! activities to send. Turns of the same conversation are serialized;
//! turns of different conversations run concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::BotConfig;
use crate::domain::dialog::{
    Activity, ActivityType, DialogContext, DialogError, DialogSet, DialogState, DialogTurnStatus,
    OutboundActivity, Outbox,
};
use crate::domain::foundation::{ConversationId, DialogId, ValidationError};
use crate::ports::{ConversationStateStore, StateStoreError};

pub const CANCELED_TEXT: &str = "Ok... canceled.";
pub const NOTHING_TO_CANCEL_TEXT: &str = "Nothing to cancel.";

/// Command to handle one inbound activity
#[derive(Debug, Clone)]
pub struct HandleTurnCommand {
    pub conversation_id: ConversationId,
    pub activity: Activity,
}

/// Result of a handled turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub activities: Vec<OutboundActivity>,
    pub status: DialogTurnStatus,
}

/// Error type for handling turns
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StateStoreError),

    #[error("Stored dialog state is unreadable: {0}")]
    CorruptState(String),
}

/// Dispatcher behavior derived from `BotConfig`
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub root_dialog: DialogId,
    pub bot_name: String,
    pub default_locale: String,
    /// Stored trimmed and lower-cased
    pub cancel_keyword: String,
    pub description: String,
    pub auto_begin_on_join: bool,
}

impl TurnSettings {
    /// Settings with the stock bot behavior and the given root dialog.
    pub fn new(root_dialog: DialogId) -> Self {
        let defaults = BotConfig::default();
        Self {
            root_dialog,
            bot_name: defaults.bot_name,
            default_locale: defaults.default_locale,
            cancel_keyword: defaults.cancel_keyword,
            description: defaults.description,
            auto_begin_on_join: defaults.auto_begin_on_join,
        }
    }

    /// # Errors
    ///
    /// Returns `EmptyField` if `root_dialog` is blank.
    pub fn from_config(config: &BotConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            root_dialog: DialogId::new(config.root_dialog.as_str())?,
            bot_name: config.bot_name.clone(),
            default_locale: config.default_locale.clone(),
            cancel_keyword: config.cancel_keyword.trim().to_lowercase(),
            description: config.description.clone(),
            auto_begin_on_join: config.auto_begin_on_join,
        })
    }

    pub fn with_cancel_keyword(mut self, keyword: impl AsRef<str>) -> Self {
        self.cancel_keyword = keyword.as_ref().trim().to_lowercase();
        self
    }

    pub fn with_auto_begin_on_join(mut self, auto_begin: bool) -> Self {
        self.auto_begin_on_join = auto_begin;
        self
    }
}

/// Handler for inbound activities
pub struct TurnDispatcher {
    dialogs: Arc<DialogSet>,
    store: Arc<dyn ConversationStateStore>,
    settings: TurnSettings,
    locks: Mutex<HashMap<ConversationId, Arc<Mutex<()>>>>,
}

impl TurnDispatcher {
    pub fn new(
        dialogs: Arc<DialogSet>,
        store: Arc<dyn ConversationStateStore>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            dialogs,
            store,
            settings,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    pub async fn handle(&self, cmd: HandleTurnCommand) -> Result<TurnResult, TurnError> {
        let guard = self.lock_conversation(&cmd.conversation_id).await;
        let result = self.handle_locked(&cmd).await;
        drop(guard);
        self.release_conversation(&cmd.conversation_id).await;

        match &result {
            Ok(turn) => tracing::info!(
                conversation_id = %cmd.conversation_id,
                status = ?turn.status,
                sent = turn.activities.len(),
                "Turn handled"
            ),
            Err(e) => tracing::error!(
                conversation_id = %cmd.conversation_id,
                error = %e,
                "Turn failed"
            ),
        }
        result
    }

    /// Drops all stored state for a conversation, e.g. after `CorruptState`.
    pub async fn reset(&self, conversation_id: &ConversationId) -> Result<(), TurnError> {
        let guard = self.lock_conversation(conversation_id).await;
        let result = self.store.delete(conversation_id).await;
        drop(guard);
        self.release_conversation(conversation_id).await;

        tracing::info!(conversation_id = %conversation_id, "Conversation state reset");
        Ok(result?)
    }

    async fn handle_locked(&self, cmd: &HandleTurnCommand) -> Result<TurnResult, TurnError> {
        // 1. Load persisted state (fresh state for a new conversation)
        let snapshot = match self.store.load(&cmd.conversation_id).await? {
            Some(blob) => DialogState::from_json(&blob)
                .map_err(|e| TurnError::CorruptState(e.to_string()))?,
            None => DialogState::new(),
        };

        // 2. Run the turn against a working copy
        let mut state = snapshot.clone();
        let mut outbox = Outbox::new();
        let outcome = self.run_turn(&mut state, &cmd.activity, &mut outbox);

        // 3. Persist exactly once: the new state, or the untouched snapshot
        match outcome {
            Ok(status) => {
                state.record_turn();
                self.store.save(&cmd.conversation_id, &state.to_json()?).await?;
                Ok(TurnResult {
                    activities: outbox.into_activities(),
                    status,
                })
            }
            Err(err) => {
                let saved = match snapshot.to_json() {
                    Ok(blob) => self.store.save(&cmd.conversation_id, &blob).await,
                    Err(e) => Err(StateStoreError::Backend(e.to_string())),
                };
                if let Err(save_err) = saved {
                    tracing::warn!(
                        conversation_id = %cmd.conversation_id,
                        error = %save_err,
                        "Failed to restore pre-turn state"
                    );
                }
                Err(err.into())
            }
        }
    }

    fn run_turn(
        &self,
        state: &mut DialogState,
        activity: &Activity,
        outbox: &mut Outbox,
    ) -> Result<DialogTurnStatus, DialogError> {
        let mut dc = DialogContext::new(
            &self.dialogs,
            &mut state.stack,
            &self.settings.default_locale,
        );

        match activity.activity_type {
            ActivityType::Message => {
                // 1. Cancellation keyword unwinds the whole stack
                if activity.normalized_text() == self.settings.cancel_keyword {
                    return Ok(match dc.cancel_all_dialogs() {
                        DialogTurnStatus::Cancelled => {
                            outbox.send(OutboundActivity::text(CANCELED_TEXT));
                            DialogTurnStatus::Cancelled
                        }
                        status => {
                            outbox.send(OutboundActivity::text(NOTHING_TO_CANCEL_TEXT));
                            status
                        }
                    });
                }

                // 2. Resume the active dialog
                let status = dc.continue_dialog(activity, outbox)?;

                // 3. Nothing said and nothing active: start the flow
                if !outbox.responded() && dc.active_dialog().is_none() {
                    return dc.begin_dialog(&self.settings.root_dialog, None, outbox);
                }
                Ok(status)
            }
            ActivityType::ConversationUpdate => {
                let greets = activity
                    .members_added
                    .iter()
                    .any(|member| member.name != self.settings.bot_name);
                if greets {
                    outbox.send(OutboundActivity::text(self.settings.description.clone()));
                    if self.settings.auto_begin_on_join && dc.active_dialog().is_none() {
                        return dc.begin_dialog(&self.settings.root_dialog, None, outbox);
                    }
                }
                Ok(match dc.active_dialog() {
                    Some(_) => DialogTurnStatus::Waiting,
                    None => DialogTurnStatus::Empty,
                })
            }
        }
    }

    async fn lock_conversation(&self, conversation_id: &ConversationId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(conversation_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    async fn release_conversation(&self, conversation_id: &ConversationId) {
        let mut locks = self.locks.lock().await;
        // Only the map holds it: no turn is running or waiting.
        if locks
            .get(conversation_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(conversation_id);
        }
    }

    #[cfg(test)]
    async fn tracked_conversations(&self) -> usize {
        self.locks.lock().await.len()
    }
}
