//! # Startup Errors
//!
//! Typed failures that stop the bot before it processes a single event.
//! Everything that happens after startup is contained by the router instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no token provided, exiting")]
    MissingCredential,

    #[error("command `{name}` from module `{module}` is already registered by module `{existing}`")]
    DuplicateCommand {
        name: String,
        module: String,
        existing: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StartupError {
    /// Static code used in startup log lines.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::DuplicateCommand { .. } => "duplicate_command",
            Self::Config(_) => "invalid_config",
        }
    }
}
