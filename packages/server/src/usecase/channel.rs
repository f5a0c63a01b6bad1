//! UseCase: チャンネルの一覧・作成・削除

use std::sync::Arc;

use crate::domain::{Channel, ChannelId, ChannelRepository, RepositoryError, UserId, UserRepository};

use super::error::ChannelError;

fn repository_error(e: RepositoryError) -> ChannelError {
    ChannelError::Repository(e)
}

/// チャンネル一覧取得のユースケース
pub struct GetChannelsUseCase {
    channels: Arc<dyn ChannelRepository>,
}

impl GetChannelsUseCase {
    pub fn new(channels: Arc<dyn ChannelRepository>) -> Self {
        Self { channels }
    }

    pub async fn execute(&self) -> Result<Vec<Channel>, ChannelError> {
        self.channels.list_channels().await.map_err(repository_error)
    }
}

/// チャンネル作成のユースケース
pub struct CreateChannelUseCase {
    channels: Arc<dyn ChannelRepository>,
    users: Arc<dyn UserRepository>,
}

impl CreateChannelUseCase {
    pub fn new(channels: Arc<dyn ChannelRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { channels, users }
    }

    /// `description` が空文字列の場合は説明なしとして保存する
    pub async fn execute(
        &self,
        name: &str,
        description: &str,
        user_id: i64,
    ) -> Result<Channel, ChannelError> {
        let name = name.trim();
        let Ok(created_by) = UserId::new(user_id) else {
            return Err(ChannelError::MissingFields);
        };
        if name.is_empty() {
            return Err(ChannelError::MissingFields);
        }

        self.users
            .find_by_id(created_by)
            .await
            .map_err(repository_error)?
            .ok_or(ChannelError::CreatorNotFound)?;

        let description = Some(description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let channel = self
            .channels
            .create_channel(name, description, created_by)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ChannelError::NameTaken,
                // 確認後に作成者が削除された
                RepositoryError::NotFound => ChannelError::CreatorNotFound,
                other => ChannelError::Repository(other),
            })?;

        tracing::info!(
            channel_id = %channel.id,
            created_by = %channel.created_by,
            "Channel '{}' created",
            channel.name
        );
        Ok(channel)
    }
}

/// チャンネル削除のユースケース（作成者のみ）
pub struct DeleteChannelUseCase {
    channels: Arc<dyn ChannelRepository>,
}

impl DeleteChannelUseCase {
    pub fn new(channels: Arc<dyn ChannelRepository>) -> Self {
        Self { channels }
    }

    /// 削除したチャンネルを返す
    pub async fn execute(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Channel, ChannelError> {
        let channel = self
            .channels
            .find_by_id(channel_id)
            .await
            .map_err(repository_error)?
            .ok_or(ChannelError::NotFound)?;

        if channel.created_by != user_id {
            tracing::warn!(
                channel_id = %channel_id,
                user_id = %user_id,
                created_by = %channel.created_by,
                "User is not the creator of the channel"
            );
            return Err(ChannelError::NotCreator);
        }

        let deleted = self
            .channels
            .delete_channel(channel_id, user_id)
            .await
            .map_err(repository_error)?;
        if !deleted {
            // 確認後に他のリクエストが削除した
            return Err(ChannelError::NotFound);
        }

        tracing::info!(channel_id = %channel_id, "Channel '{}' deleted", channel.name);
        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        StoredUser,
        repository::{MockChannelRepository, MockUserRepository},
    };
    use hiroba_shared::time::{Clock, FixedClock};

    fn channel(id: i64, name: &str, created_by: i64) -> Channel {
        Channel {
            id: ChannelId::new(id).unwrap(),
            name: name.to_string(),
            description: None,
            created_by: UserId::new(created_by).unwrap(),
            created_by_username: "alice".to_string(),
            created_at: FixedClock::from_millis(0).now(),
        }
    }

    fn users_with_alice() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            Ok((id.value() == 1).then(|| StoredUser {
                id,
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
                created_at: FixedClock::from_millis(0).now(),
            }))
        });
        users
    }

    #[tokio::test]
    async fn test_create_channel_with_blank_description() {
        // テスト項目: 空の説明は説明なしとして作成される
        // given (前提条件):
        let mut channels = MockChannelRepository::new();
        channels
            .expect_create_channel()
            .withf(|name, description, created_by| {
                name.to_string() == "general" && description.is_none() && created_by.value() == 1
            })
            .times(1)
            .returning(|name, _, created_by| Ok(channel(10, name, created_by.value())));
        let usecase = CreateChannelUseCase::new(Arc::new(channels), Arc::new(users_with_alice()));

        // when (操作):
        let result = usecase.execute(" general ", "  ", 1).await;

        // then (期待する結果):
        let created = result.unwrap();
        assert_eq!(created.id.value(), 10);
        assert_eq!(created.name, "general");
    }

    #[tokio::test]
    async fn test_create_channel_validation() {
        // テスト項目: 名前・ユーザー ID の欠落と未登録ユーザーは作成前に拒否される
        // given (前提条件):
        let mut channels = MockChannelRepository::new();
        channels.expect_create_channel().never();
        let usecase = CreateChannelUseCase::new(Arc::new(channels), Arc::new(users_with_alice()));

        // when (操作):
        let no_name = usecase.execute("", "desc", 1).await;
        let no_user = usecase.execute("general", "desc", 0).await;
        let unknown_user = usecase.execute("general", "desc", 42).await;

        // then (期待する結果):
        assert_eq!(no_name, Err(ChannelError::MissingFields));
        assert_eq!(no_user, Err(ChannelError::MissingFields));
        assert_eq!(unknown_user, Err(ChannelError::CreatorNotFound));
    }

    #[tokio::test]
    async fn test_create_channel_duplicate_name() {
        // テスト項目: 同名チャンネルの作成は NameTaken になる
        // given (前提条件):
        let mut channels = MockChannelRepository::new();
        channels
            .expect_create_channel()
            .returning(|_, _, _| Err(RepositoryError::Conflict("UNIQUE".to_string())));
        let usecase = CreateChannelUseCase::new(Arc::new(channels), Arc::new(users_with_alice()));

        // when (操作):
        let result = usecase.execute("general", "", 1).await;

        // then (期待する結果):
        assert_eq!(result, Err(ChannelError::NameTaken));
    }

    #[tokio::test]
    async fn test_delete_channel_by_creator() {
        // テスト項目: 作成者はチャンネルを削除でき、削除したチャンネルが返る
        // given (前提条件):
        let mut channels = MockChannelRepository::new();
        channels
            .expect_find_by_id()
            .returning(|id| Ok(Some(channel(id.value(), "general", 1))));
        channels
            .expect_delete_channel()
            .times(1)
            .returning(|_, _| Ok(true));
        let usecase = DeleteChannelUseCase::new(Arc::new(channels));

        // when (操作):
        let result = usecase
            .execute(ChannelId::new(3).unwrap(), UserId::new(1).unwrap())
            .await;

        // then (期待する結果):
        assert_eq!(result.map(|c| c.name), Ok("general".to_string()));
    }

    #[tokio::test]
    async fn test_delete_channel_not_creator_or_missing() {
        // テスト項目: 作成者以外は NotCreator、存在しないチャンネルは NotFound
        // given (前提条件):
        let mut channels = MockChannelRepository::new();
        channels.expect_find_by_id().returning(|id| {
            Ok((id.value() == 3).then(|| channel(3, "general", 1)))
        });
        channels.expect_delete_channel().never();
        let usecase = DeleteChannelUseCase::new(Arc::new(channels));

        // when (操作):
        let by_bob = usecase
            .execute(ChannelId::new(3).unwrap(), UserId::new(2).unwrap())
            .await;
        let missing = usecase
            .execute(ChannelId::new(4).unwrap(), UserId::new(1).unwrap())
            .await;

        // then (期待する結果):
        assert_eq!(by_bob, Err(ChannelError::NotCreator));
        assert_eq!(missing, Err(ChannelError::NotFound));
    }

    #[tokio::test]
    async fn test_get_channels() {
        // テスト項目: チャンネル一覧は Repository の結果をそのまま返す
        // given (前提条件):
        let mut channels = MockChannelRepository::new();
        channels
            .expect_list_channels()
            .returning(|| Ok(vec![channel(1, "general", 1), channel(2, "random", 1)]));
        let usecase = GetChannelsUseCase::new(Arc::new(channels));

        // when (操作):
        let result = usecase.execute().await.unwrap();

        // then (期待する結果):
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].name, "random");
    }
}
