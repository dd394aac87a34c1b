//! # Bot State
//!
//! Process-wide state shared by every command: the owner identity, the start
//! time and the message of the day.
//!
//! The motd has exactly one writer, the owner-only `set-motd` command. Everything
//! else only reads it, so a plain `RwLock` around the scalar is enough.

use crate::domain::traits::Store;
use chrono::{DateTime, Utc};
use std::sync::RwLock;

pub const MOTD_KEY: &str = "motd";

#[derive(Debug)]
pub struct BotState {
    owner: String,
    started_at: DateTime<Utc>,
    motd: RwLock<Option<String>>,
}

impl BotState {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            started_at: Utc::now(),
            motd: RwLock::new(None),
        }
    }

    /// Restores the persisted motd. A storage failure leaves it unset.
    pub async fn load(owner: impl Into<String>, store: &dyn Store) -> Self {
        let state = Self::new(owner);
        match store.get(MOTD_KEY).await {
            Ok(motd) => state.replace_motd(motd),
            Err(e) => tracing::warn!("Failed to restore motd: {}", e),
        }
        state
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }

    pub fn motd(&self) -> Option<String> {
        self.motd
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Sets the motd; blank text clears it. Only `set-motd` calls this.
    pub fn set_motd(&self, motd: &str) -> Option<String> {
        let motd = Some(motd.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        self.replace_motd(motd.clone());
        motd
    }

    fn replace_motd(&self, motd: Option<String>) {
        *self
            .motd
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = motd;
    }
}

/// Formats a duration as `1d 2h 3m 4s`, dropping leading zero units.
pub fn pretty_duration(duration: chrono::Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        total % 86_400 / 3_600,
        total % 3_600 / 60,
        total % 60,
    );

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));
    parts.join(" ")
}
