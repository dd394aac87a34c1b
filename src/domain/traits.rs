//! # Domain Traits
//!
//! Abstract interfaces for the external collaborators (Chat, Storage, Quotes).
//! Allows for pluggable implementations in the Infrastructure layer and in tests.

use crate::domain::types::Quote;
use async_trait::async_trait;

/// Abstract interface for a Chat Provider bound to a single room (e.g., Matrix).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the room, returning the new event id
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Reply to a specific message in the room
    async fn reply(&self, event_id: &str, content: &str) -> Result<String, String>;

    /// Delete (redact) a message in the room
    async fn delete_message(&self, event_id: &str) -> Result<(), String>;

    /// Look up who sent `event_id`, `None` if it cannot be resolved
    async fn event_sender(&self, event_id: &str) -> Option<String>;

    /// Get a provider for another room the bot has joined
    fn other_room(&self, room_id: &str) -> Option<Box<dyn ChatProvider>>;

    /// Get the current room ID
    fn room_id(&self) -> String;

    /// Get the user id the bot is logged in as
    fn own_user_id(&self) -> String;
}

/// Persistent key-value storage. Handlers treat it as read-only except for
/// the owner-only commands that persist bot state.
#[async_trait]
pub trait Store: Send + Sync {
    /// Human readable backend/version string, `None` if the backend cannot tell
    async fn version(&self) -> Option<String>;

    async fn get(&self, key: &str) -> Result<Option<String>, String>;

    async fn put(&self, key: &str, value: Option<&str>) -> Result<(), String>;
}

/// External source of quotes, looked up by tag.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn random_quote(&self, tag: &str) -> anyhow::Result<QuoteLookup>;
}

/// Outcome of a quote lookup that did not fail at the transport level.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteLookup {
    Found(Quote),
    /// The tag is empty or has no quotes
    NotFound,
    /// The page was fetched but its layout was not understood
    Unparseable,
}
