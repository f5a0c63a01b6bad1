//! MessagePusher trait 定義
//!
//! UseCase 層がチャットイベントを配信するためのインターフェース。
//! 実装（`infrastructure::hub::Hub`）がシリアライズとチャンネル内への fan-out を担当する。

use async_trait::async_trait;

use super::{ChatEvent, MessagePushError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// `event.channel_id` のメンバー全員（送信者を含む）へ配信
    async fn broadcast(&self, event: &ChatEvent) -> Result<(), MessagePushError>;
}
