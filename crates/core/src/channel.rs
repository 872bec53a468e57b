//! Channel trait: the abstraction over chat platforms.
//!
//! A Channel connects the relay to a messaging surface. It receives messages
//! from users and sends replies back, one transport-sized segment at a time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ChannelError;
use crate::message::UserId;

/// A message received from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Platform user who sent the message
    pub sender_id: UserId,

    /// The text content
    pub content: String,

    /// The chat/group/DM identifier within the channel
    pub chat_id: String,
}

/// The core Channel trait.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "cli").
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<ChannelMessage, ChannelError>>,
        ChannelError,
    >;

    /// Send one message to a chat. `content` must already fit the platform's
    /// payload limit.
    async fn send(&self, chat_id: &str, content: &str) -> std::result::Result<(), ChannelError>;

    /// Send an ordered sequence of segments, stopping at the first failure.
    async fn send_all(
        &self,
        chat_id: &str,
        segments: &[String],
    ) -> std::result::Result<(), ChannelError> {
        for segment in segments {
            self.send(chat_id, segment).await?;
        }
        Ok(())
    }

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }
}
