//! Repository の実装
//!
//! - `sqlite`: sqlx + SQLite を使った実装

pub mod sqlite;

pub use sqlite::{
    SqliteChannelRepository, SqliteHealthProbe, SqliteMessageRepository, SqliteUserRepository,
};
