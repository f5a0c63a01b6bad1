//! WebSocket connection handler.

use std::sync::Arc;

use axum::{
    extract::{Path, State, ws::WebSocketUpgrade},
    http::StatusCode,
    response::Response,
};

use crate::{
    domain::{ChannelId, UserId},
    ui::{client, error::ApiError, state::AppState},
};

use super::http::parse_id;

/// GET /api/ws/{channel_id}/{user_id}
///
/// Everything that can fail is checked before the upgrade: malformed ids are
/// 400, an unknown user or channel is 404, a hub that has been shut down is 503.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path((channel_id, user_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let channel_id: ChannelId = parse_id(&channel_id, "channel ID")?;
    let user_id: UserId = parse_id(&user_id, "user ID")?;

    let hub = state.hub.get_or_start().clone();
    if hub.is_closed() {
        tracing::warn!(user_id = %user_id, "Rejecting connection, server is shutting down");
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Server is shutting down",
        ));
    }

    let user = state
        .connect_participant_usecase
        .execute(channel_id, user_id)
        .await
        .inspect_err(|e| {
            tracing::warn!(user_id = %user_id, channel_id = %channel_id, "Connection rejected: {}", e);
        })?;

    let send_message = state.send_message_usecase(&hub);
    let pump = state.pump;

    Ok(ws
        .max_message_size(pump.max_message_size)
        .on_upgrade(move |socket| {
            client::serve(socket, hub, Arc::new(user), channel_id, send_message, pump)
        }))
}
