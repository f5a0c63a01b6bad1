//! 接続ハブ（チャンネル単位のブロードキャスト）
//!
//! ## 概要
//!
//! 接続中クライアントのレジストリを単一の制御ループが所有し、
//! 登録・解除・ブロードキャスト・通知・シャットダウンはすべて
//! [`HubCommand`] として 1 本の受信箱に送られ、到着順に 1 件ずつ処理されます。
//!
//! - [`Hub`]: 制御ループへのハンドル（`Clone` 可能、どのタスクからでも利用可）
//! - [`HubGate`]: プロセスにつき 1 つのハブを遅延起動するゲート
//!
//! `Hub` は `MessagePusher` を実装しているため、UseCase 層からは
//! ドメインの trait 越しに利用されます。

mod registry;

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use hiroba_shared::time::Clock;

use crate::{
    domain::{ChannelId, ChatEvent, ConnectionId, MessagePushError, MessagePusher, User},
    infrastructure::dto::conversion::encode_event,
};

/// ハブ受信箱の容量
const INBOX_CAPACITY: usize = 1024;

/// シリアライズ済みの 1 フレーム。全受信者で共有される。
pub type Frame = Arc<str>;

/// ハブ操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// 制御ループが既に終了している
    #[error("Hub is closed")]
    Closed,
    /// shutdown が 2 回呼ばれた
    #[error("Hub has already been shut down")]
    AlreadyShutDown,
}

/// レジストリに登録される 1 接続分の情報
///
/// `sender` を保持しているのはレジストリだけなので、
/// レジストリから取り除かれた時点で送信キューが閉じます。
pub struct ClientHandle {
    pub id: ConnectionId,
    pub user: Arc<User>,
    pub channel_id: ChannelId,
    sender: mpsc::Sender<Frame>,
}

impl ClientHandle {
    /// 容量 `capacity` の送信キューを作り、ハンドルと受信側を返す
    pub fn new(
        user: Arc<User>,
        channel_id: ChannelId,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Frame>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = Self {
            id: ConnectionId::generate(),
            user,
            channel_id,
            sender,
        };
        (handle, receiver)
    }
}

/// 制御ループへのコマンド
pub enum HubCommand {
    Register(ClientHandle),
    Unregister(ConnectionId),
    Broadcast { channel_id: ChannelId, frame: Frame },
    Notify { text: String, channel_id: ChannelId },
    Shutdown(oneshot::Sender<()>),
    CountClients(oneshot::Sender<usize>),
}

/// 制御ループへのハンドル
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::Sender<HubCommand>,
}

impl Hub {
    /// 制御ループを起動する
    pub fn spawn(clock: Arc<dyn Clock>) -> Self {
        let (commands, inbox) = mpsc::channel(INBOX_CAPACITY);
        tokio::spawn(registry::run(registry::Registry::new(clock), inbox));
        tracing::info!("Hub started");
        Self { commands }
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    pub async fn register(&self, client: ClientHandle) -> Result<(), HubError> {
        self.send(HubCommand::Register(client)).await
    }

    /// 未登録・解除済みの接続に対しては何もしない
    pub async fn unregister(&self, id: ConnectionId) -> Result<(), HubError> {
        self.send(HubCommand::Unregister(id)).await
    }

    pub async fn broadcast(&self, channel_id: ChannelId, frame: Frame) -> Result<(), HubError> {
        self.send(HubCommand::Broadcast { channel_id, frame }).await
    }

    /// チャンネルにシステム通知を送る
    pub async fn notify(
        &self,
        text: impl Into<String>,
        channel_id: ChannelId,
    ) -> Result<(), HubError> {
        self.send(HubCommand::Notify {
            text: text.into(),
            channel_id,
        })
        .await
    }

    pub async fn client_count(&self) -> Result<usize, HubError> {
        let (reply, answer) = oneshot::channel();
        self.send(HubCommand::CountClients(reply)).await?;
        answer.await.map_err(|_| HubError::Closed)
    }

    /// 全クライアントを切断して制御ループを終了する
    ///
    /// 戻った時点で全送信キューは閉じている。2 回目以降の呼び出しは
    /// [`HubError::AlreadyShutDown`] を返す。
    pub async fn shutdown(&self) -> Result<(), HubError> {
        let (reply, ack) = oneshot::channel();
        self.commands
            .send(HubCommand::Shutdown(reply))
            .await
            .map_err(|_| HubError::AlreadyShutDown)?;
        ack.await.map_err(|_| HubError::AlreadyShutDown)
    }

    async fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands.send(command).await.map_err(|_| HubError::Closed)
    }
}

#[async_trait]
impl MessagePusher for Hub {
    async fn broadcast(&self, event: &ChatEvent) -> Result<(), MessagePushError> {
        let text = encode_event(event).map_err(|e| MessagePushError::Serialize(e.to_string()))?;
        Hub::broadcast(self, event.channel_id, Frame::from(text))
            .await
            .map_err(|_| MessagePushError::HubClosed)
    }
}

/// プロセスにつき 1 つのハブを遅延起動するゲート
///
/// 最初の接続要求で [`Hub::spawn`] が 1 回だけ呼ばれる。
pub struct HubGate {
    hub: OnceLock<Hub>,
    clock: Arc<dyn Clock>,
}

impl HubGate {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            hub: OnceLock::new(),
            clock,
        }
    }

    pub fn get_or_start(&self) -> &Hub {
        self.hub.get_or_init(|| Hub::spawn(self.clock.clone()))
    }

    /// 起動済みのハブ（未起動なら `None`）
    pub fn get(&self) -> Option<&Hub> {
        self.hub.get()
    }

    /// ハブを停止する
    ///
    /// 未起動の場合も起動してから停止するので、以降の接続要求は
    /// 閉じたハブを見ることになる。
    pub async fn shutdown(&self) -> Result<(), HubError> {
        self.get_or_start().shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageContent, UserId},
        infrastructure::dto::websocket::{EventMessage, MessageType},
    };
    use hiroba_shared::time::FixedClock;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::from_millis(1_700_000_000_000))
    }

    fn user(id: i64, name: &str) -> Arc<User> {
        Arc::new(User::with_color(
            UserId::new(id).unwrap(),
            name,
            "#96CEB4",
            clock().now(),
        ))
    }

    async fn next_message(rx: &mut mpsc::Receiver<Frame>) -> EventMessage {
        let frame = rx.recv().await.unwrap();
        serde_json::from_str(&frame).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_broadcast_through_handle() {
        // テスト項目: ハンドル経由で登録したクライアントにチャットが届く
        // given (前提条件):
        let hub = Hub::spawn(clock());
        let channel_id = ChannelId::new(7).unwrap();
        let alice = user(1, "alice");
        let (handle, mut rx) = ClientHandle::new(alice.clone(), channel_id, 8);
        hub.register(handle).await.unwrap();
        let joined = next_message(&mut rx).await;
        let event = ChatEvent::chat(
            &alice,
            channel_id,
            MessageContent::new("hello".to_string()).unwrap(),
            clock().now(),
        );

        // when (操作):
        MessagePusher::broadcast(&hub, &event).await.unwrap();

        // then (期待する結果):
        assert_eq!(joined.content, "alice has joined the chat");
        let chat = next_message(&mut rx).await;
        assert_eq!(chat.r#type, MessageType::Chat);
        assert_eq!(chat.user_id, Some(1));
        assert_eq!(chat.content, "hello");
        assert_eq!(hub.client_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_queues_and_second_call_fails() {
        // テスト項目: shutdown 後は全キューが閉じ、2 回目の shutdown はエラーになる
        // given (前提条件):
        let hub = Hub::spawn(clock());
        let (handle, mut rx) = ClientHandle::new(user(1, "alice"), ChannelId::new(7).unwrap(), 8);
        hub.register(handle).await.unwrap();
        next_message(&mut rx).await;

        // when (操作):
        let first = hub.shutdown().await;
        let second = hub.shutdown().await;

        // then (期待する結果):
        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(HubError::AlreadyShutDown));
        assert!(rx.recv().await.is_none());
        assert!(hub.is_closed());
        assert_eq!(
            hub.notify("late", ChannelId::new(7).unwrap()).await,
            Err(HubError::Closed)
        );
    }

    #[tokio::test]
    async fn test_gate_starts_a_single_hub() {
        // テスト項目: ゲートは 1 つのハブだけを起動し、shutdown 後は閉じたハブを返す
        // given (前提条件):
        let gate = HubGate::new(clock());
        assert!(gate.get().is_none());

        // when (操作):
        let first = gate.get_or_start().clone();
        let (handle, _rx) = ClientHandle::new(user(1, "alice"), ChannelId::new(7).unwrap(), 8);
        first.register(handle).await.unwrap();
        let count_via_gate = gate.get_or_start().client_count().await.unwrap();
        gate.shutdown().await.unwrap();

        // then (期待する結果):
        assert_eq!(count_via_gate, 1);
        assert!(gate.get_or_start().is_closed());
    }
}
