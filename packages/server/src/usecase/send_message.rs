//! UseCase: チャットメッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 受信フレームの正規化 → 永続化 → チャンネルへのブロードキャスト
//!
//! ### どのような状況を想定しているか
//! - 正常系：永続化に成功したメッセージだけがブロードキャストされる
//! - 異常系：永続化の失敗・タイムアウト時はブロードキャストしない
//! - エッジケース：空白だけのフレームは何もしない

use std::{sync::Arc, time::Duration};

use hiroba_shared::time::Clock;

use crate::domain::{
    ChannelId, ChatEvent, MessageContent, MessagePusher, MessageRepository, User,
};

use super::error::SendMessageError;

/// チャットメッセージ送信のユースケース
pub struct SendMessageUseCase {
    messages: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// 永続化 1 回あたりの期限
    persist_timeout: Duration,
}

impl SendMessageUseCase {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        persist_timeout: Duration,
    ) -> Self {
        Self {
            messages,
            message_pusher,
            clock,
            persist_timeout,
        }
    }

    /// 受信した 1 フレームを処理する
    ///
    /// # Returns
    ///
    /// * `Ok(Some(event))` - 永続化・ブロードキャストしたイベント
    /// * `Ok(None)` - 空白だけのフレームだったため何もしなかった
    /// * `Err(SendMessageError)` - 永続化またはブロードキャストに失敗
    pub async fn execute(
        &self,
        sender: &User,
        channel_id: ChannelId,
        raw: &str,
    ) -> Result<Option<ChatEvent>, SendMessageError> {
        let Some(content) = MessageContent::from_frame(raw) else {
            return Ok(None);
        };

        // 1. 永続化（成功したものだけを配信する）
        tokio::time::timeout(
            self.persist_timeout,
            self.messages
                .persist_chat_message(sender.id, channel_id, content.as_str()),
        )
        .await
        .map_err(|_| SendMessageError::PersistTimeout)?
        .map_err(SendMessageError::Persist)?;

        // 2. チャンネルへブロードキャスト
        let event = ChatEvent::chat(sender, channel_id, content, self.clock.now());
        self.message_pusher.broadcast(&event).await?;

        Ok(Some(event))
    }
}
