//! # Interface Layer
//!
//! The user-facing command modules registered with the dispatcher.

pub mod commands;
