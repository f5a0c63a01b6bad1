//! Domain layer: value objects, entities, and the interfaces the use cases depend on.

pub mod entity;
pub mod error;
pub mod message;
pub mod password;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Channel, HistoryEntry, StoredUser, USER_COLOR_PALETTE, User};
pub use error::{MessagePushError, PasswordError, RepositoryError, ValueObjectError};
pub use message::{ChatEvent, EventKind, NOTIFICATION_COLOR, Sender};
pub use password::PasswordHasher;
pub use pusher::MessagePusher;
pub use repository::{ChannelRepository, HealthProbe, MessageRepository, UserRepository};
pub use value_object::{ChannelId, ConnectionId, MessageContent, UserId};
