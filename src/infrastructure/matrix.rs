//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! This module acts as the bridge between the generic `ChatProvider` interface used by the
//! command handlers and the specific implementation details of the Matrix SDK.

use crate::domain::traits::ChatProvider;
use async_trait::async_trait;
use matrix_sdk::RoomState;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::relation::InReplyTo;
use matrix_sdk::ruma::events::room::message::{Relation, RoomMessageEventContent};
use matrix_sdk::ruma::{EventId, OwnedUserId, RoomId};
use std::convert::TryFrom;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    fn own_user_id(&self) -> String {
        self.room.own_user_id().as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.room
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn reply(&self, event_id: &str, content: &str) -> Result<String, String> {
        let event_id = <&EventId>::try_from(event_id).map_err(|e| e.to_string())?;
        let mut message = RoomMessageEventContent::text_markdown(content);
        message.relates_to = Some(Relation::Reply {
            in_reply_to: InReplyTo::new(event_id.to_owned()),
        });

        tracing::info!("Bot replying to {} in {}: {}", event_id, self.room_id(), content);
        self.room
            .send(message)
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn delete_message(&self, event_id: &str) -> Result<(), String> {
        let event_id = <&EventId>::try_from(event_id).map_err(|e| e.to_string())?;
        self.room
            .redact(event_id, None, None)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn event_sender(&self, event_id: &str) -> Option<String> {
        let event_id = <&EventId>::try_from(event_id).ok()?;
        match self.room.event(event_id, None).await {
            Ok(event) => event
                .raw()
                .get_field::<OwnedUserId>("sender")
                .ok()
                .flatten()
                .map(|sender| sender.to_string()),
            Err(e) => {
                tracing::debug!("Could not fetch replied-to event {}: {}", event_id, e);
                None
            }
        }
    }

    fn other_room(&self, room_id: &str) -> Option<Box<dyn ChatProvider>> {
        let room_id = <&RoomId>::try_from(room_id).ok()?;
        self.room
            .client()
            .get_room(room_id)
            .filter(|room| accepts_messages(room.state()))
            .map(|room| Box::new(MatrixService::new(room)) as Box<dyn ChatProvider>)
    }
}

/// Invited, knocked and left rooms are known to the client but cannot be posted to.
fn accepts_messages(state: RoomState) -> bool {
    matches!(state, RoomState::Joined)
}
