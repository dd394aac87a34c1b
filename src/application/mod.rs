//! # Application Layer
//!
//! Contains the core logic and orchestration of the bot.
//! This includes invocation parsing, the command registry, the authorization gate,
//! per-invocation context, dispatch and shared bot state.

pub mod auth;
pub mod context;
pub mod parsing;
pub mod registry;
pub mod router;
pub mod state;
