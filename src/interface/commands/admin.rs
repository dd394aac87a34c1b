//! # Administration Commands
//!
//! `say`, `sayin`, `invite`, `help`, `commands`, `set-motd` and `throw`.
//! The hidden ones are either owner-only or diagnostics and stay out of `commands`.

use crate::application::context::Context;
use crate::application::registry::{CommandDescriptor, Module};
use crate::application::state::{MOTD_KEY, pretty_duration};
use crate::strings::{help, messages};
use anyhow::{Result, anyhow, bail};

pub const BOT_NAME: &str = "Maiden";

pub fn module() -> Module {
    Module::new(
        "administration",
        vec![
            CommandDescriptor::new("say", say).hidden().owner_only(),
            CommandDescriptor::new("sayin", sayin).hidden().owner_only(),
            CommandDescriptor::new("invite", invite).summary("Invite the bot to your room"),
            CommandDescriptor::new("help", about).summary("About this bot"),
            CommandDescriptor::new("commands", commands).summary("List of commands"),
            CommandDescriptor::new("set-motd", set_motd)
                .hidden()
                .owner_only(),
            CommandDescriptor::sync("throw", throw).hidden(),
        ],
    )
}

/// Repeat `text` in the room, removing the command message.
async fn say(ctx: Context, text: String) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    if let Err(e) = ctx.delete_trigger().await {
        tracing::warn!("Could not delete say trigger in {}: {:#}", ctx.room_id(), e);
    }
    ctx.send(&text).await
}

/// `sayin <room id> <text>`
async fn sayin(ctx: Context, query: String) -> Result<()> {
    let Some((room, text)) = query.split_once(char::is_whitespace) else {
        return ctx.reply(messages::SAYIN_USAGE).await;
    };
    let text = text.trim();
    if text.is_empty() {
        return ctx.reply(messages::SAYIN_USAGE).await;
    }

    if !ctx.send_to(room, text).await? {
        ctx.reply(messages::CANT_DO_THAT).await?;
    }
    Ok(())
}

async fn invite(ctx: Context, _args: String) -> Result<()> {
    let name = display_name(&ctx);
    match ctx.config.bot.invite_url.as_deref() {
        Some(url) => ctx.reply(&messages::invite(name, url)).await,
        None => ctx.reply(messages::NO_INVITE).await,
    }
}

async fn about(ctx: Context, _args: String) -> Result<()> {
    let store_version = ctx.store.version().await;
    let uptime = pretty_duration(ctx.bot.uptime());
    let motd = ctx.bot.motd();

    let text = help::about(&help::About {
        name: display_name(&ctx),
        owner: ctx.bot.owner(),
        prefix: ctx.prefix(),
        store_version: store_version.as_deref(),
        uptime: &uptime,
        motd: motd.as_deref(),
        source_url: &ctx.config.bot.source_url,
    });
    ctx.reply(&text).await
}

async fn commands(ctx: Context, _args: String) -> Result<()> {
    let text = help::command_list(
        ctx.prefix(),
        ctx.registry
            .list_visible()
            .map(|(_, command)| (command.name.as_str(), command.summary.as_deref())),
    );
    ctx.reply(&text).await
}

/// The only writer of the message of the day.
async fn set_motd(ctx: Context, motd: String) -> Result<()> {
    let motd = ctx.bot.set_motd(&motd);
    ctx.store
        .put(MOTD_KEY, motd.as_deref())
        .await
        .map_err(|e| anyhow!("Failed to persist motd: {}", e))?;
    ctx.reply(&messages::motd_set(motd.as_deref())).await
}

fn throw(_ctx: &Context, _args: &str) -> Result<()> {
    bail!("Success")
}

fn display_name(ctx: &Context) -> &str {
    ctx.config
        .services
        .matrix
        .display_name
        .as_deref()
        .unwrap_or(BOT_NAME)
}
