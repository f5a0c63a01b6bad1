//! Server execution logic.

use std::{future::Future, path::PathBuf, sync::Arc};

use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::{
    handler::{
        create_channel, create_user, delete_channel, get_channels, get_message_history,
        health_check, login, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Chat server: REST API, WebSocket endpoint and (optionally) the built frontend
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state, Some("./web/dist".into()));
/// server.run("127.0.0.1", 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// 静的ファイルのディレクトリ（`index.html` にフォールバック）
    static_dir: Option<PathBuf>,
}

impl Server {
    pub fn new(state: AppState, static_dir: Option<PathBuf>) -> Self {
        Self {
            state: Arc::new(state),
            static_dir,
        }
    }

    pub fn router(&self) -> Router {
        let api = Router::new()
            // WebSocket エンドポイント
            .route("/api/ws/{channel_id}/{user_id}", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/users", post(create_user))
            .route("/api/users/login", post(login))
            .route("/api/channels", get(get_channels).post(create_channel))
            .route(
                "/api/channels/{channel_id}/users/{user_id}",
                delete(delete_channel),
            )
            .route(
                "/api/channels/{channel_id}/messages",
                get(get_message_history),
            )
            .route("/api/health", get(health_check))
            .with_state(self.state.clone());

        let app = match &self.static_dir {
            Some(dir) => {
                let index = ServeFile::new(dir.join("index.html"));
                api.fallback_service(ServeDir::new(dir).fallback(index))
            }
            None => api,
        };

        app.layer(TraceLayer::new_for_http())
    }

    /// Run the chat server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/api/ws/{{channelId}}/{{userId}}", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on `listener` until `shutdown` resolves.
    ///
    /// On shutdown the hub is stopped first so every live connection gets a
    /// close frame, then axum drains the remaining HTTP connections.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let state = self.state.clone();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                match state.hub.shutdown().await {
                    Ok(()) => tracing::info!("All WebSocket clients disconnected"),
                    Err(e) => tracing::warn!("Hub shutdown: {}", e),
                }
            })
            .await
    }
}
