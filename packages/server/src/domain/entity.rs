//! Entities: the connected chat participant and the persisted records.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;

use super::value_object::{ChannelId, UserId};

/// Colors handed out to connected users.
///
/// Entries may repeat and two users may get the same color.
pub const USER_COLOR_PALETTE: [&str; 15] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9", "#F8C471", "#82E0AA", "#F1948A", "#85C1E9", "#D7DBDD",
];

/// A participant of a live connection.
///
/// Created once per accepted WebSocket and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub color: String,
    pub joined_at: DateTime<Utc>,
}

impl User {
    /// Create a user with a color picked uniformly from [`USER_COLOR_PALETTE`].
    pub fn new(id: UserId, display_name: impl Into<String>, joined_at: DateTime<Utc>) -> Self {
        let color = USER_COLOR_PALETTE
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_COLOR_PALETTE[0]);
        Self::with_color(id, display_name, color, joined_at)
    }

    pub fn with_color(
        id: UserId,
        display_name: impl Into<String>,
        color: impl Into<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            color: color.into(),
            joined_at,
        }
    }
}

/// A user row as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A channel row joined with its creator's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_by_username: String,
    pub created_at: DateTime<Utc>,
}

/// One persisted chat message, as returned by the history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: i64,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
