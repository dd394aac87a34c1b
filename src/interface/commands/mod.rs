//! # Command Modules
//!
//! Every module the bot registers at startup, in listing order.

pub mod admin;
pub mod quote;

use crate::application::registry::Module;

pub fn modules() -> Vec<Module> {
    vec![admin::module(), quote::module()]
}
