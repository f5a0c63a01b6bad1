//! Shared helpers for the in-process integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::StreamExt;
use hiroba_server::{
    config::PumpConfig,
    domain::{ChannelRepository, UserId, UserRepository},
    infrastructure::{
        dto::websocket::EventMessage,
        password::BcryptPasswordHasher,
        repository::{
            SqliteChannelRepository, SqliteHealthProbe, SqliteMessageRepository,
            SqliteUserRepository, sqlite,
        },
    },
    ui::{AppState, Repositories, Server, Settings},
};
use hiroba_shared::time::SystemClock;
use sqlx::SqlitePool;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

pub const APP_VERSION: &str = "test-version";

/// How long a test waits for a frame before giving up.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// A server bound to an ephemeral port on top of an in-memory database
pub struct TestServer {
    pub addr: SocketAddr,
    pub pool: SqlitePool,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestServer {
    pub async fn start() -> Self {
        let pool = sqlite::connect_in_memory()
            .await
            .expect("Failed to open in-memory database");

        let repositories = Repositories {
            users: Arc::new(SqliteUserRepository::new(pool.clone())),
            channels: Arc::new(SqliteChannelRepository::new(pool.clone())),
            messages: Arc::new(SqliteMessageRepository::new(pool.clone())),
            health: Arc::new(SqliteHealthProbe::new(pool.clone())),
        };
        let settings = Settings {
            pump: PumpConfig::default(),
            messages_limit: 50,
            app_version: APP_VERSION.to_string(),
        };
        let state = AppState::new(
            repositories,
            // 最小コストでテストを高速化
            Arc::new(BcryptPasswordHasher::new(4)),
            Arc::new(SystemClock),
            settings,
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let (shutdown, signal) = oneshot::channel::<()>();
        let server = Server::new(state, None);
        let handle = tokio::spawn(server.serve(listener, async move {
            let _ = signal.await;
        }));

        Self {
            addr,
            pool,
            shutdown: Some(shutdown),
            handle: Some(handle),
        }
    }

    pub fn http(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws(&self, channel_id: impl std::fmt::Display, user_id: impl std::fmt::Display) -> String {
        format!("ws://{}/api/ws/{}/{}", self.addr, channel_id, user_id)
    }

    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            tokio::time::timeout(Duration::from_secs(10), handle)
                .await
                .expect("Server did not stop in time")
                .expect("Server task panicked")
                .expect("Server returned an error");
        }
    }

    pub async fn create_user(&self, username: &str) -> i64 {
        SqliteUserRepository::new(self.pool.clone())
            .create_user(username, "not-a-real-hash")
            .await
            .expect("Failed to create user")
            .id
            .value()
    }

    pub async fn create_channel(&self, name: &str, created_by: i64) -> i64 {
        SqliteChannelRepository::new(self.pool.clone())
            .create_channel(name, None, UserId::new(created_by).expect("invalid user id"))
            .await
            .expect("Failed to create channel")
            .id
            .value()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Open a WebSocket and wait until the client's own join notification arrives.
pub async fn join(server: &TestServer, channel_id: i64, user_id: i64, name: &str) -> WsClient {
    let (mut ws, _) = tokio_tungstenite::connect_async(server.ws(channel_id, user_id))
        .await
        .expect("WebSocket handshake failed");

    let expected = format!("{} has joined the chat", name);
    loop {
        let event = next_event(&mut ws).await.expect("connection closed before join");
        if event.content == expected {
            return ws;
        }
    }
}

/// Next chat/notification frame, skipping control frames.
///
/// `None` when the server closed the connection.
pub async fn next_event(ws: &mut WsClient) -> Option<EventMessage> {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for a frame");
        match frame {
            Some(Ok(Message::Text(text))) => {
                return Some(serde_json::from_str(text.as_str()).expect("malformed frame"));
            }
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
            Some(Ok(_)) => continue,
        }
    }
}

/// Assert that no chat/notification frame arrives within `wait`.
pub async fn assert_silent(ws: &mut WsClient, wait: Duration) {
    match tokio::time::timeout(wait, ws.next()).await {
        Err(_) => {}
        Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => {}
        Ok(other) => panic!("expected no frame, got {:?}", other),
    }
}
