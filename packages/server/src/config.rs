//! Server configuration.
//!
//! Every flag can also be given as an environment variable (a `.env` file is
//! loaded by the binary before parsing).

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// Number of history messages returned when `MESSAGES_LIMIT` is unset or invalid.
pub const DEFAULT_MESSAGES_LIMIT: i64 = 50;

#[derive(Parser, Debug, Clone)]
#[command(name = "hiroba-server")]
#[command(about = "Real-time chat server with per-channel WebSocket broadcast", long_about = None)]
pub struct Config {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://hiroba.db")]
    pub database_url: String,

    /// Maximum number of messages returned by the history endpoint
    #[arg(long, env = "MESSAGES_LIMIT", default_value_t = DEFAULT_MESSAGES_LIMIT, allow_negative_numbers = true)]
    pub messages_limit: i64,

    /// Version reported by the health check
    #[arg(long, env = "APP_VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub app_version: String,

    /// Directory of the built frontend to serve at `/`
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// bcrypt cost factor for new password hashes
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Default log level when `RUST_LOG` is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// History limit, falling back to the default for non-positive values.
    pub fn effective_messages_limit(&self) -> i64 {
        if self.messages_limit > 0 {
            self.messages_limit
        } else {
            DEFAULT_MESSAGES_LIMIT
        }
    }
}

/// Timing and sizing of the per-connection read/write pumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpConfig {
    /// Deadline for a single outbound write
    pub write_wait: Duration,
    /// Read idle deadline, refreshed on every pong
    pub pong_wait: Duration,
    /// Largest inbound message accepted, in bytes
    pub max_message_size: usize,
    /// Capacity of each client's outbound queue
    pub queue_capacity: usize,
    /// Deadline for persisting one chat message
    pub persist_timeout: Duration,
}

impl PumpConfig {
    /// Keepalive ping interval: 9/10 of the write deadline.
    pub fn ping_period(&self) -> Duration {
        self.write_wait * 9 / 10
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            write_wait: Duration::from_secs(10),
            pong_wait: Duration::from_secs(60),
            max_message_size: 512,
            queue_capacity: 256,
            persist_timeout: Duration::from_secs(5),
        }
    }
}
