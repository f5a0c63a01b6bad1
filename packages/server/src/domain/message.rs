//! Chat events fanned out by the hub.
//!
//! A `ChatEvent` is either a user-authored chat line or a system notification
//! (join/leave). Both serialize to the same wire envelope; only the kind and the
//! presence of the sender differ.

use chrono::{DateTime, Utc};

use super::{
    entity::User,
    value_object::{ChannelId, MessageContent, UserId},
};

/// Color of system notifications.
pub const NOTIFICATION_COLOR: &str = "#666666";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Chat,
    Notification,
}

/// Identity of a chat line's author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub kind: EventKind,
    /// Always `Some` for chat lines, always `None` for notifications.
    pub sender: Option<Sender>,
    pub channel_id: ChannelId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub color: String,
}

impl ChatEvent {
    /// A chat line written by `user` in `channel_id`.
    pub fn chat(
        user: &User,
        channel_id: ChannelId,
        content: MessageContent,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: EventKind::Chat,
            sender: Some(Sender {
                id: user.id,
                name: user.display_name.clone(),
            }),
            channel_id,
            content: content.into_string(),
            timestamp,
            color: user.color.clone(),
        }
    }

    /// A system notification scoped to `channel_id`.
    pub fn notification(
        text: impl Into<String>,
        channel_id: ChannelId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: EventKind::Notification,
            sender: None,
            channel_id,
            content: text.into(),
            timestamp,
            color: NOTIFICATION_COLOR.to_string(),
        }
    }

    pub fn joined(user: &User, channel_id: ChannelId, timestamp: DateTime<Utc>) -> Self {
        Self::notification(
            format!("{} has joined the chat", user.display_name),
            channel_id,
            timestamp,
        )
    }

    pub fn left(user: &User, channel_id: ChannelId, timestamp: DateTime<Utc>) -> Self {
        Self::notification(
            format!("{} has left the chat", user.display_name),
            channel_id,
            timestamp,
        )
    }
}
