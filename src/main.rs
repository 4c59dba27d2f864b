//! Console driver: one conversation over stdin/stdout.
//!
//! Usage: `slot-filler [conversation-id]`. Passing the id of an earlier run
//! resumes it when a persistent backend is configured.

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use slot_filler::adapters::{FileStateStore, InMemoryStateStore, RedisStateStore};
use slot_filler::application::{
    profile_dialog_set, HandleTurnCommand, TurnDispatcher, TurnResult, TurnSettings,
};
use slot_filler::config::{AppConfig, ConfigError, LoggingConfig, StorageBackend};
use slot_filler::domain::dialog::{dialog_set_from_yaml, Activity, DialogError, DialogSet};
use slot_filler::domain::foundation::{ConversationId, ValidationError};
use slot_filler::ports::{ConversationStateStore, StateStoreError};

const USER_NAME: &str = "User";

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid setting: {0}")]
    Setting(#[from] ValidationError),

    #[error("Dialog definition error: {0}")]
    Dialog(#[from] DialogError),

    #[error("State store error: {0}")]
    Store(#[from] StateStoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;

    init_tracing(&config.logging);

    let dialogs = load_dialogs(config.bot.schema_path.as_deref()).await?;
    let store = build_store(&config).await?;
    let settings = TurnSettings::from_config(&config.bot)?;
    let dispatcher = TurnDispatcher::new(Arc::new(dialogs), store, settings);

    let conversation_id = match std::env::args().nth(1) {
        Some(id) => ConversationId::from_string(id)?,
        None => ConversationId::new(),
    };
    tracing::info!(conversation_id = %conversation_id, backend = ?config.storage.backend, "Conversation started");

    deliver(
        &dispatcher,
        &conversation_id,
        Activity::members_added([USER_NAME]),
    )
    .await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        deliver(&dispatcher, &conversation_id, Activity::message(line)).await;
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let fmt_layer = if logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str())),
        )
        .with(fmt_layer)
        .init();
}

async fn load_dialogs(schema_path: Option<&Path>) -> Result<DialogSet, StartupError> {
    match schema_path {
        Some(path) => {
            let yaml = tokio::fs::read_to_string(path).await?;
            tracing::info!(path = %path.display(), "Loaded flow definition");
            Ok(dialog_set_from_yaml(&yaml)?)
        }
        None => Ok(profile_dialog_set()?),
    }
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn ConversationStateStore>, StartupError> {
    let store: Arc<dyn ConversationStateStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryStateStore::new()),
        StorageBackend::File => Arc::new(FileStateStore::new(&config.storage.path)),
        StorageBackend::Redis => Arc::new(RedisStateStore::connect(&config.redis).await?),
    };
    Ok(store)
}

async fn deliver(dispatcher: &TurnDispatcher, conversation_id: &ConversationId, activity: Activity) {
    let cmd = HandleTurnCommand {
        conversation_id: conversation_id.clone(),
        activity,
    };
    match dispatcher.handle(cmd).await {
        Ok(result) => print_turn(&result),
        Err(e) => eprintln!("! {}", e),
    }
}

fn print_turn(result: &TurnResult) {
    for activity in &result.activities {
        println!("> {}", activity.text);
        if !activity.suggested_actions.is_empty() {
            let actions: Vec<String> = activity
                .suggested_actions
                .iter()
                .map(|action| format!("[{}]", action))
                .collect();
            println!("  {}", actions.join(" "));
        }
    }
}
