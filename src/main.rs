#![recursion_limit = "256"]
//! # Main Entry Point
//!
//! Wires the bot together:
//! - Domain: Configuration, Types and collaborator Traits
//! - Infrastructure: Matrix, Storage, Goodreads
//! - Application: Registry, Router, Context, Bot State
//! - Interface: Command Modules
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client, SessionMeta, SessionTokens,
    authentication::matrix::MatrixSession,
    config::SyncSettings,
    room::Room,
    ruma::{
        UserId,
        events::room::{
            member::{MembershipState, StrippedRoomMemberEvent},
            message::{MessageType, Relation, SyncRoomMessageEvent},
        },
    },
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing_appender::non_blocking::WorkerGuard;

use crate::application::context::Services;
use crate::application::registry::Registry;
use crate::application::router::CommandRouter;
use crate::application::state::BotState;
use crate::domain::config::{AppConfig, StorageConfig};
use crate::domain::error::StartupError;
use crate::domain::traits::Store;
use crate::domain::types::IncomingMessage;
use crate::infrastructure::goodreads::GoodreadsClient;
use crate::infrastructure::matrix::MatrixService;
use crate::infrastructure::store::JsonStore;
use crate::strings::logs;

#[derive(Parser, Debug)]
#[command(name = "maiden", version, about = "Prefix-command bot for Matrix")]
struct Cli {
    /// Matrix access token for the bot account
    token: String,

    /// Path to the YAML configuration
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Credentials & Configuration
    let cli = Cli::parse();
    if cli.token.trim().is_empty() {
        return Err(StartupError::MissingCredential.into());
    }

    let config = AppConfig::load(&cli.config)?;

    // 2. Logging Setup
    let _guard = init_logging()?;
    tracing::info!(
        "{}",
        logs::config_loaded(
            &cli.config.display().to_string(),
            &config.services.matrix.user_id
        )
    );

    // 3. Command Registry
    let modules = interface::commands::modules();
    let module_count = modules.len();
    let registry = match Registry::from_modules(modules) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("{}", logs::startup_failed(e.error_code(), &e.to_string()));
            return Err(e.into());
        }
    };
    tracing::info!(
        "{}",
        logs::registry_built(registry.len(), module_count)
    );

    // 4. Collaborators
    let store = open_store(&config.storage).await?;
    tracing::info!(
        "{}",
        logs::store_opened(store.version().await.as_deref().unwrap_or("unknown"))
    );
    let bot = BotState::load(config.bot.owner.clone(), store.as_ref()).await;
    let quotes = GoodreadsClient::new()?;

    let services = Services {
        config: Arc::new(config.clone()),
        registry: Arc::new(registry),
        bot: Arc::new(bot),
        store,
        quotes: Arc::new(quotes),
    };

    // 5. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    let session = MatrixSession {
        meta: SessionMeta {
            user_id: UserId::parse(config.services.matrix.user_id.as_str())
                .context("Invalid services.matrix.user_id")?,
            device_id: config.services.matrix.device_id.as_str().into(),
        },
        tokens: SessionTokens {
            access_token: cli.token.clone(),
            refresh_token: None,
        },
    };
    client
        .restore_session(session)
        .await
        .context("Failed to restore Matrix session")?;
    tracing::info!("{}", logs::LOGIN_SUCCESS);

    if let Some(name) = &config.services.matrix.display_name {
        tracing::info!("{}", logs::setting_display_name(name));
        if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
            tracing::warn!("{}", logs::set_display_name_fail(&e.to_string()));
        }
    }

    // 6. Event Handlers
    let start_time = SystemTime::now();
    let router = Arc::new(CommandRouter::new(services));

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = router.clone();

        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore the backlog delivered by the first sync
            let ts = ev.origin_server_ts();
            let event_time = UNIX_EPOCH + Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }

            let MessageType::Text(text_content) = &original_msg.content.msgtype else {
                return;
            };

            let chat = MatrixService::new(room);
            let in_reply_to = match &original_msg.content.relates_to {
                Some(Relation::Reply { in_reply_to }) => Some(in_reply_to.event_id.to_string()),
                _ => None,
            };
            let message = IncomingMessage {
                body: text_content.body.clone(),
                sender: Some(original_msg.sender.to_string()),
                event_id: original_msg.event_id.to_string(),
                in_reply_to,
                in_reply_to_sender: None,
            };

            // Runs detached, reply lookups included; the router logs the outcome
            let _ = router.route(Arc::new(chat), message);
        }
    });

    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            tracing::info!("{}", logs::invite_received(room.room_id().as_str()));
            if let Err(e) = room.join().await {
                tracing::warn!("{}", logs::join_invite_fail(&e.to_string()));
            }
        }
    });

    // 7. Sync Loop
    tracing::info!("{}", logs::SYNC_LOOP_START);
    tokio::select! {
        result = client.sync(SyncSettings::default()) => {
            if let Err(e) = result {
                tracing::error!("{}", logs::sync_loop_fail(&e.to_string()));
                return Err(e.into());
            }
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                tracing::error!("{}", logs::shutdown_fail(&e.to_string()));
            }
            tracing::info!("{}", logs::SHUTDOWN);
        }
    }

    Ok(())
}

/// Console plus `data/session.log`, filtered by `RUST_LOG`.
fn init_logging() -> Result<WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    if !Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

async fn open_store(config: &StorageConfig) -> Result<Arc<dyn Store>> {
    #[cfg(feature = "redis")]
    if let Some(url) = &config.redis_url {
        let store = crate::infrastructure::store::RedisStore::connect(url).await?;
        return Ok(Arc::new(store));
    }

    #[cfg(not(feature = "redis"))]
    if config.redis_url.is_some() {
        tracing::warn!(
            "storage.redis_url is set but redis support is not compiled in; using {}",
            config.path
        );
    }

    Ok(Arc::new(JsonStore::open(&config.path).await?))
}
