//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{MessagePushError, PasswordError, RepositoryError};

/// WebSocket 接続受付のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("User not found")]
    UserNotFound,

    #[error("Channel not found")]
    ChannelNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// チャットメッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// 永続化が期限内に終わらなかった
    #[error("Persisting the message timed out")]
    PersistTimeout,

    #[error("Failed to persist message: {0}")]
    Persist(RepositoryError),

    #[error("Failed to broadcast message: {0}")]
    Broadcast(#[from] MessagePushError),
}

/// ユーザー登録・ログインのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("Username and password cannot be empty")]
    EmptyCredentials,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("User not found")]
    NotFound,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// チャンネル操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Channel name and user ID are required")]
    MissingFields,

    #[error("User not found")]
    CreatorNotFound,

    #[error("Channel name is already taken")]
    NameTaken,

    #[error("Channel not found")]
    NotFound,

    #[error("Only the channel creator can delete this channel")]
    NotCreator,

    #[error(transparent)]
    Repository(RepositoryError),
}
