//! # Command Context
//!
//! The bundle every command handler receives: who asked, where to answer, and
//! handles to the registry, the shared bot state and the external collaborators.
//! A fresh context is built for each invocation and dropped when the handler ends.

use crate::application::registry::Registry;
use crate::application::state::BotState;
use crate::domain::config::AppConfig;
use crate::domain::traits::{ChatProvider, QuoteSource, Store};
use crate::domain::types::IncomingMessage;
use anyhow::{Result, anyhow};
use std::sync::Arc;

/// Long-lived handles shared by all invocations.
#[derive(Clone)]
pub struct Services {
    pub config: Arc<AppConfig>,
    pub registry: Arc<Registry>,
    pub bot: Arc<BotState>,
    pub store: Arc<dyn Store>,
    pub quotes: Arc<dyn QuoteSource>,
}

#[derive(Clone)]
pub struct Context {
    pub requester: Option<String>,
    /// Event id of the message that triggered the command
    pub event_id: String,
    pub chat: Arc<dyn ChatProvider>,
    pub config: Arc<AppConfig>,
    pub registry: Arc<Registry>,
    pub bot: Arc<BotState>,
    pub store: Arc<dyn Store>,
    pub quotes: Arc<dyn QuoteSource>,
}

impl Context {
    pub fn new(services: &Services, chat: Arc<dyn ChatProvider>, message: &IncomingMessage) -> Self {
        Self {
            requester: message.sender.clone(),
            event_id: message.event_id.clone(),
            chat,
            config: services.config.clone(),
            registry: services.registry.clone(),
            bot: services.bot.clone(),
            store: services.store.clone(),
            quotes: services.quotes.clone(),
        }
    }

    pub fn room_id(&self) -> String {
        self.chat.room_id()
    }

    pub fn prefix(&self) -> &str {
        &self.config.bot.prefix
    }

    /// Reply to the triggering message.
    pub async fn reply(&self, content: &str) -> Result<()> {
        self.chat
            .reply(&self.event_id, content)
            .await
            .map(|_| ())
            .map_err(|e| anyhow!(e))
    }

    /// Send a plain message to the room the command came from.
    pub async fn send(&self, content: &str) -> Result<()> {
        self.chat
            .send_message(content)
            .await
            .map(|_| ())
            .map_err(|e| anyhow!(e))
    }

    /// Send a message to another room the bot has joined.
    pub async fn send_to(&self, room_id: &str, content: &str) -> Result<bool> {
        let Some(room) = self.chat.other_room(room_id) else {
            return Ok(false);
        };
        room.send_message(content).await.map_err(|e| anyhow!(e))?;
        Ok(true)
    }

    /// Delete the triggering message.
    pub async fn delete_trigger(&self) -> Result<()> {
        self.chat
            .delete_message(&self.event_id)
            .await
            .map_err(|e| anyhow!(e))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory collaborators shared by the router and command tests.

    use super::*;
    use crate::application::registry::Module;
    use crate::domain::traits::QuoteLookup;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub const OWNER: &str = "@owner:example.org";
    pub const STRANGER: &str = "@stranger:example.org";
    pub const BOT: &str = "@maiden:example.org";
    pub const ROOM: &str = "!room:example.org";

    #[derive(Debug, Clone, PartialEq)]
    pub enum Action {
        Sent { room: String, content: String },
        Replied { event_id: String, content: String },
        Deleted { event_id: String },
    }

    /// Records every platform call; shared between rooms so cross-room sends show up.
    #[derive(Clone)]
    pub struct FakeChat {
        room: String,
        pub actions: Arc<Mutex<Vec<Action>>>,
        known_rooms: Vec<String>,
        senders: HashMap<String, String>,
        fail_sends: bool,
        stall_lookups: bool,
    }

    impl FakeChat {
        pub fn new() -> Self {
            Self {
                room: ROOM.to_string(),
                actions: Arc::new(Mutex::new(Vec::new())),
                known_rooms: vec![ROOM.to_string(), "!other:example.org".to_string()],
                senders: HashMap::new(),
                fail_sends: false,
                stall_lookups: false,
            }
        }

        /// Sender lookups never complete.
        pub fn stalling() -> Self {
            Self {
                stall_lookups: true,
                ..Self::new()
            }
        }

        pub fn with_sender(mut self, event_id: &str, sender: &str) -> Self {
            self.senders.insert(event_id.to_string(), sender.to_string());
            self
        }

        pub fn failing() -> Self {
            Self {
                fail_sends: true,
                ..Self::new()
            }
        }

        pub fn actions(&self) -> Vec<Action> {
            self.actions.lock().unwrap().clone()
        }

        fn record(&self, action: Action) -> Result<(), String> {
            if self.fail_sends {
                return Err("M_FORBIDDEN: not allowed".to_string());
            }
            self.actions.lock().unwrap().push(action);
            Ok(())
        }
    }

    #[async_trait]
    impl ChatProvider for FakeChat {
        async fn send_message(&self, content: &str) -> Result<String, String> {
            self.record(Action::Sent {
                room: self.room.clone(),
                content: content.to_string(),
            })?;
            Ok("$sent".to_string())
        }

        async fn reply(&self, event_id: &str, content: &str) -> Result<String, String> {
            self.record(Action::Replied {
                event_id: event_id.to_string(),
                content: content.to_string(),
            })?;
            Ok("$reply".to_string())
        }

        async fn delete_message(&self, event_id: &str) -> Result<(), String> {
            self.record(Action::Deleted {
                event_id: event_id.to_string(),
            })
        }

        async fn event_sender(&self, event_id: &str) -> Option<String> {
            if self.stall_lookups {
                std::future::pending::<()>().await;
            }
            self.senders.get(event_id).cloned()
        }

        fn other_room(&self, room_id: &str) -> Option<Box<dyn ChatProvider>> {
            self.known_rooms.iter().any(|r| r == room_id).then(|| {
                Box::new(FakeChat {
                    room: room_id.to_string(),
                    ..self.clone()
                }) as Box<dyn ChatProvider>
            })
        }

        fn room_id(&self) -> String {
            self.room.clone()
        }

        fn own_user_id(&self) -> String {
            BOT.to_string()
        }
    }

    #[derive(Default)]
    pub struct MemoryStore {
        pub values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl Store for MemoryStore {
        async fn version(&self) -> Option<String> {
            Some("memory".to_string())
        }

        async fn get(&self, key: &str) -> Result<Option<String>, String> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn put(&self, key: &str, value: Option<&str>) -> Result<(), String> {
            let mut values = self.values.lock().unwrap();
            match value {
                Some(value) => values.insert(key.to_string(), value.to_string()),
                None => values.remove(key),
            };
            Ok(())
        }
    }

    pub struct FixedQuotes(pub QuoteLookup);

    #[async_trait]
    impl QuoteSource for FixedQuotes {
        async fn random_quote(&self, tag: &str) -> anyhow::Result<QuoteLookup> {
            if tag == "explode" {
                anyhow::bail!("connection reset by peer");
            }
            Ok(self.0.clone())
        }
    }

    pub fn config() -> AppConfig {
        AppConfig::from_yaml(&format!(
            r#"
services:
  matrix:
    homeserver: "https://matrix.example.org"
    user_id: "{BOT}"
    device_id: "MAIDEN"
bot:
  owner: "{OWNER}"
  invite_url: "https://matrix.to/#/{BOT}"
"#
        ))
        .unwrap()
    }

    pub fn services(modules: Vec<Module>) -> Services {
        services_with(modules, QuoteLookup::NotFound)
    }

    pub fn services_with(modules: Vec<Module>, quotes: QuoteLookup) -> Services {
        Services {
            config: Arc::new(config()),
            registry: Arc::new(Registry::from_modules(modules).unwrap()),
            bot: Arc::new(BotState::new(OWNER)),
            store: Arc::new(MemoryStore::default()),
            quotes: Arc::new(FixedQuotes(quotes)),
        }
    }

    pub fn message(sender: Option<&str>, body: &str) -> IncomingMessage {
        IncomingMessage {
            body: body.to_string(),
            sender: sender.map(str::to_string),
            event_id: "$trigger".to_string(),
            ..Default::default()
        }
    }

    pub fn context(services: &Services, chat: &FakeChat, sender: Option<&str>) -> Context {
        Context::new(services, Arc::new(chat.clone()), &message(sender, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;

    #[tokio::test]
    async fn test_reply_and_delete_target_trigger() {
        let services = services(vec![]);
        let chat = FakeChat::new();
        let ctx = context(&services, &chat, Some(OWNER));

        ctx.reply("pong").await.unwrap();
        ctx.delete_trigger().await.unwrap();

        assert_eq!(
            chat.actions(),
            vec![
                Action::Replied {
                    event_id: "$trigger".into(),
                    content: "pong".into()
                },
                Action::Deleted {
                    event_id: "$trigger".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_send_to_unknown_room() {
        let services = services(vec![]);
        let chat = FakeChat::new();
        let ctx = context(&services, &chat, Some(OWNER));

        assert!(!ctx.send_to("!nowhere:example.org", "hi").await.unwrap());
        assert!(ctx.send_to("!other:example.org", "hi").await.unwrap());
        assert_eq!(
            chat.actions(),
            vec![Action::Sent {
                room: "!other:example.org".into(),
                content: "hi".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_platform_errors_surface_as_errors() {
        let services = services(vec![]);
        let chat = FakeChat::failing();
        let ctx = context(&services, &chat, Some(OWNER));
        let err = ctx.send("hello").await.unwrap_err();
        assert!(err.to_string().contains("M_FORBIDDEN"));
    }
}
