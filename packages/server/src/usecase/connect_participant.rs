//! UseCase: 参加者接続処理
//!
//! WebSocket のアップグレード前に呼ばれ、接続してくるユーザーとチャンネルが
//! 実在することを確認して、接続ごとの [`User`] を生成します。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{ChannelId, ChannelRepository, User, UserId, UserRepository};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    users: Arc<dyn UserRepository>,
    channels: Arc<dyn ChannelRepository>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        channels: Arc<dyn ChannelRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            channels,
            clock,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - 色が割り当てられた接続中のユーザー
    /// * `Err(ConnectError)` - ユーザーまたはチャンネルが存在しない
    pub async fn execute(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<User, ConnectError> {
        // 1. ユーザーの存在確認
        let stored = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ConnectError::UserNotFound)?;

        // 2. チャンネルの存在確認
        self.channels
            .find_by_id(channel_id)
            .await?
            .ok_or(ConnectError::ChannelNotFound)?;

        Ok(User::new(stored.id, stored.username, self.clock.now()))
    }
}
