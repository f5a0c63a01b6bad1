//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// Discriminator of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Chat,
    Notification,
}

/// The single envelope used for every outbound frame.
///
/// `userId` and `username` are omitted (not null) for notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    pub r#type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub channel_id: i64,
    pub content: String,
    /// RFC 3339
    pub timestamp: String,
    pub color: String,
}
