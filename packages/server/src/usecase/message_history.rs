//! UseCase: チャンネルのメッセージ履歴取得

use std::sync::Arc;

use crate::domain::{ChannelId, HistoryEntry, MessageRepository, RepositoryError};

pub struct GetMessageHistoryUseCase {
    messages: Arc<dyn MessageRepository>,
    /// 返す最大件数
    limit: i64,
}

impl GetMessageHistoryUseCase {
    pub fn new(messages: Arc<dyn MessageRepository>, limit: i64) -> Self {
        Self { messages, limit }
    }

    /// 直近のメッセージを古い順で返す（存在しないチャンネルは空）
    pub async fn execute(&self, channel_id: ChannelId) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let history = self.messages.history(channel_id, self.limit).await?;
        tracing::debug!(channel_id = %channel_id, count = history.len(), "Fetched message history");
        Ok(history)
    }
}
