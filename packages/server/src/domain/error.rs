//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの生成に失敗したときのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must be positive (got {0})")]
    InvalidUserId(i64),

    #[error("channel id must be positive (got {0})")]
    InvalidChannelId(i64),

    #[error("message content must not be blank")]
    EmptyContent,
}

/// Repository（永続化層）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 対象の行が存在しない
    #[error("record not found")]
    NotFound,

    /// 一意制約違反など
    #[error("conflict: {0}")]
    Conflict(String),

    /// その他のデータベースエラー
    #[error("database error: {0}")]
    Database(String),
}

/// MessagePusher（配信層）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("failed to serialize message: {0}")]
    Serialize(String),

    #[error("hub is no longer accepting messages")]
    HubClosed,
}

/// パスワードハッシュ処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("failed to verify password: {0}")]
    Verify(String),
}
