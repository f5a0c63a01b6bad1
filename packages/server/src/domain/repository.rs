//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Channel, ChannelId, HistoryEntry, RepositoryError, StoredUser, UserId};

/// User Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを作成（`password_hash` はハッシュ済みの値）
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<StoredUser, RepositoryError>;

    /// ID でユーザーを取得
    async fn find_by_id(&self, id: UserId) -> Result<Option<StoredUser>, RepositoryError>;

    /// ユーザー名でユーザーを取得
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, RepositoryError>;
}

/// Channel Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// 全チャンネルを ID 順で取得
    async fn list_channels(&self) -> Result<Vec<Channel>, RepositoryError>;

    /// ID でチャンネルを取得
    async fn find_by_id(&self, id: ChannelId) -> Result<Option<Channel>, RepositoryError>;

    /// チャンネルを作成
    async fn create_channel(
        &self,
        name: &str,
        description: Option<String>,
        created_by: UserId,
    ) -> Result<Channel, RepositoryError>;

    /// 作成者が一致する場合のみチャンネルを削除。削除できたら `true`
    async fn delete_channel(
        &self,
        id: ChannelId,
        created_by: UserId,
    ) -> Result<bool, RepositoryError>;
}

/// Message Repository trait
///
/// 多数の read pump から同時に呼ばれるため、実装は並行な INSERT に耐える必要がある。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// チャットメッセージを 1 件保存
    async fn persist_chat_message(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), RepositoryError>;

    /// チャンネルの直近 `limit` 件を古い順で取得
    async fn history(
        &self,
        channel_id: ChannelId,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, RepositoryError>;
}

/// データストアの死活確認
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> Result<(), RepositoryError>;
}
