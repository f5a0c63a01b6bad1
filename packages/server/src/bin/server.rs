//! Hiroba chat server.
//!
//! Serves the REST API, the per-channel WebSocket endpoint and, when
//! `--static-dir` is given, the built frontend.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --database-url sqlite://chat.db
//! ```

use std::sync::Arc;

use clap::Parser;

use hiroba_server::{
    config::{Config, PumpConfig},
    infrastructure::{
        password::BcryptPasswordHasher,
        repository::{
            SqliteChannelRepository, SqliteHealthProbe, SqliteMessageRepository,
            SqliteUserRepository, sqlite,
        },
    },
    ui::{AppState, Repositories, Server, Settings},
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    // .env is optional
    let dotenv = dotenvy::dotenv();
    let config = Config::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // Initialize dependencies in order:
    // 1. Database
    // 2. Repositories
    // 3. AppState (UseCases, Hub gate)
    // 4. Server

    // 1. Open the database and apply migrations
    let pool = match sqlite::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to open database '{}': {}", config.database_url, e);
            std::process::exit(1);
        }
    };

    // 2. Create Repositories (SQLite implementation)
    let repositories = Repositories {
        users: Arc::new(SqliteUserRepository::new(pool.clone())),
        channels: Arc::new(SqliteChannelRepository::new(pool.clone())),
        messages: Arc::new(SqliteMessageRepository::new(pool.clone())),
        health: Arc::new(SqliteHealthProbe::new(pool.clone())),
    };

    // 3. Create AppState
    let settings = Settings {
        pump: PumpConfig::default(),
        messages_limit: config.effective_messages_limit(),
        app_version: config.app_version.clone(),
    };
    let state = AppState::new(
        repositories,
        Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
        Arc::new(SystemClock),
        settings,
    );

    // 4. Create and run the server
    let server = Server::new(state, config.static_dir.clone());
    if let Err(e) = server.run(&config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    pool.close().await;
}
