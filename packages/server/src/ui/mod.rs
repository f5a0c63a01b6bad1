//! UI 層: axum のルーター、ハンドラ、接続ごとのポンプ

pub mod client;
pub mod error;
mod handler;
mod server;
mod signal;
pub mod state;

pub use error::ApiError;
pub use server::Server;
pub use signal::shutdown_signal;
pub use state::{AppState, Repositories, Settings};
