//! # Command Router
//!
//! Routes incoming messages to the registered command handlers.
//! It parses the command string (e.g., `m!say hello`), checks the caller is allowed
//! to run it, and runs the handler as its own tokio task so that a slow or failing
//! command never holds up the event loop or other commands.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::application::auth::{self, Decision};
use crate::application::context::{Context, Services};
use crate::application::parsing::parse_invocation;
use crate::domain::traits::ChatProvider;
use crate::domain::types::IncomingMessage;
use crate::strings::{logs, messages};

/// Terminal state of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a command after all, e.g. a reply to one of the bot's messages
    Ignored,
    /// No command with that name; nothing is said to the user
    Unmatched,
    /// The gate refused and a refusal was sent instead
    Denied,
    Completed,
    Failed(String),
}

pub struct CommandRouter {
    services: Services,
}

impl CommandRouter {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Entry point for every message event. Never awaits.
    ///
    /// Returns `None` when the message can already be told apart from a command.
    /// Otherwise the work runs on its own task and the handle resolves to its
    /// outcome; callers are free to drop it. Replies need their target's author
    /// looked up, which happens on that task.
    pub fn route(
        &self,
        chat: Arc<dyn ChatProvider>,
        message: IncomingMessage,
    ) -> Option<JoinHandle<Outcome>> {
        if message.sender.as_deref() == Some(chat.own_user_id().as_str()) {
            return None;
        }
        if message.in_reply_to.is_none() {
            parse_invocation(&message.body, &self.services.config.bot.prefix)?;
        }

        Some(tokio::spawn(handle_message(
            self.services.clone(),
            chat,
            message,
        )))
    }
}

async fn handle_message(
    services: Services,
    chat: Arc<dyn ChatProvider>,
    mut message: IncomingMessage,
) -> Outcome {
    if message.in_reply_to_sender.is_none()
        && let Some(event_id) = &message.in_reply_to
    {
        message.in_reply_to_sender = chat.event_sender(event_id).await;
    }

    // Replies to the bot are conversation, not commands
    let own_id = chat.own_user_id();
    if message.in_reply_to_sender.as_deref() == Some(own_id.as_str()) {
        tracing::info!(
            "{}",
            logs::reply_received(
                message.sender.as_deref().unwrap_or(logs::UNKNOWN_USER),
                message.in_reply_to.as_deref().unwrap_or_default(),
                &message.body,
                &chat.room_id(),
            )
        );
        return Outcome::Ignored;
    }

    let Some(invocation) = parse_invocation(&message.body, &services.config.bot.prefix) else {
        return Outcome::Ignored;
    };
    let (name, args) = (invocation.name.to_string(), invocation.args.to_string());

    tracing::info!(
        "{}",
        logs::command_used(
            message.sender.as_deref().unwrap_or(logs::UNKNOWN_USER),
            &name,
            &args,
            &chat.room_id(),
        )
    );

    let ctx = Context::new(&services, chat, &message);
    dispatch(ctx, name, args).await
}

/// Runs one invocation to a terminal state. Never panics or returns an error.
pub async fn dispatch(ctx: Context, name: String, args: String) -> Outcome {
    let Some(command) = ctx.registry.lookup(&name) else {
        tracing::debug!("{}", logs::unknown_command(&name));
        return Outcome::Unmatched;
    };

    let requester = ctx.requester.clone();
    let room = ctx.room_id();
    let who = requester.as_deref().unwrap_or(logs::UNKNOWN_USER);

    if auth::authorize(requester.as_deref(), command.access, ctx.bot.owner()) == Decision::Deny {
        tracing::warn!("{}", logs::command_denied(who, &name, &room));
        if let Err(e) = ctx.reply(&messages::refusal(requester.as_deref())).await {
            tracing::error!("{}", logs::refusal_failed(who, &name, &room, &format!("{e:#}")));
        }
        return Outcome::Denied;
    }

    // The whole remainder is the single argument. Building the handler's future
    // happens inside the guard too, so an eager panic is contained as well.
    let result = AssertUnwindSafe(async move { command.invoke(ctx, args).await })
        .catch_unwind()
        .await;

    let error = match result {
        Ok(Ok(())) => return Outcome::Completed,
        Ok(Err(e)) => format!("{e:#}"),
        Err(panic) => panic_message(panic.as_ref()),
    };

    tracing::error!("{}", logs::command_failed(who, &name, &room, &error));
    Outcome::Failed(error)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
