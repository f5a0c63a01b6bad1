//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{
    create_channel, create_user, delete_channel, get_channels, get_message_history,
    health_check, login,
};
pub use websocket::websocket_handler;
