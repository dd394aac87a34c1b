//! # Domain Types
//!
//! Common data structures used across the application logic.

/// A text message delivered by the chat platform.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncomingMessage {
    pub body: String,
    /// Author id, `None` when the platform could not resolve it
    pub sender: Option<String>,
    pub event_id: String,
    /// Event id of the message this one replies to
    pub in_reply_to: Option<String>,
    /// Author of the message this one replies to; resolved off the intake path when unset
    pub in_reply_to_sender: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub text: String,
    pub author: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    /// Zero based position of the quote among all quotes for the tag
    pub index: usize,
    pub total: usize,
}
