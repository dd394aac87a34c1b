//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (ChatProvider, Store, QuoteSource).

pub mod goodreads;
pub mod matrix;
pub mod store;
