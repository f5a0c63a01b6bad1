//! Conversion logic between domain entities and DTOs.

use hiroba_shared::time::to_rfc3339;

use crate::domain::{Channel, ChatEvent, EventKind, HistoryEntry, StoredUser};
use crate::infrastructure::dto::{http, websocket as ws};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<EventKind> for ws::MessageType {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Chat => Self::Chat,
            EventKind::Notification => Self::Notification,
        }
    }
}

impl From<&ChatEvent> for ws::EventMessage {
    fn from(event: &ChatEvent) -> Self {
        Self {
            r#type: event.kind.into(),
            user_id: event.sender.as_ref().map(|s| s.id.value()),
            username: event.sender.as_ref().map(|s| s.name.clone()),
            channel_id: event.channel_id.value(),
            content: event.content.clone(),
            timestamp: to_rfc3339(event.timestamp),
            color: event.color.clone(),
        }
    }
}

/// Serialize an event into the JSON text of one WebSocket frame.
pub fn encode_event(event: &ChatEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ws::EventMessage::from(event))
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<&StoredUser> for http::UserDto {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id.value(),
            username: user.username.clone(),
        }
    }
}

impl From<Channel> for http::ChannelResponseDto {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id.value(),
            name: channel.name,
            description: channel.description.unwrap_or_default(),
            created_by: channel.created_by.value(),
            created_by_username: channel.created_by_username,
            created_at: to_rfc3339(channel.created_at),
        }
    }
}

impl From<HistoryEntry> for http::MessageDto {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id,
            channel_id: entry.channel_id.value(),
            user_id: entry.user_id.value(),
            user_username: entry.username,
            content: entry.content,
            timestamp: to_rfc3339(entry.created_at),
        }
    }
}
