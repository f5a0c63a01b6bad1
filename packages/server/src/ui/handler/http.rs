//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{ChannelId, UserId},
    infrastructure::dto::http::{
        ChannelResponseDto, CreateChannelRequestDto, CredentialsRequestDto,
        DeleteChannelResponseDto, HealthCheckResponseDto, MessageDto, UserDto,
    },
    ui::{error::ApiError, state::AppState},
    usecase::HealthStatus,
};

/// Parse a positive integer id from a path segment.
pub(super) fn parse_id<T>(raw: &str, what: &str) -> Result<T, ApiError>
where
    T: TryFrom<i64>,
{
    raw.parse::<i64>()
        .ok()
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| {
            tracing::debug!("Invalid {} '{}'", what, raw);
            ApiError::bad_request(format!("Invalid {}", what))
        })
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::bad_request("Invalid request body")
    })
}

/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let request = json_body(body)?;
    let user = state
        .create_user_usecase
        .execute(&request.username, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserDto::from(&user))))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequestDto>, JsonRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let request = json_body(body)?;
    let user = state
        .login_usecase
        .execute(&request.username, &request.password)
        .await?;

    tracing::info!(user_id = %user.id, "User '{}' logged in", user.username);
    Ok(Json(UserDto::from(&user)))
}

/// GET /api/channels
pub async fn get_channels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChannelResponseDto>>, ApiError> {
    let channels = state.get_channels_usecase.execute().await?;

    // Domain Model から DTO への変換
    Ok(Json(channels.into_iter().map(Into::into).collect()))
}

/// POST /api/channels
pub async fn create_channel(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateChannelRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<ChannelResponseDto>), ApiError> {
    let request = json_body(body)?;
    let channel = state
        .create_channel_usecase
        .execute(&request.name, &request.description, request.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(channel.into())))
}

/// DELETE /api/channels/{channel_id}/users/{user_id}
pub async fn delete_channel(
    State(state): State<Arc<AppState>>,
    Path((channel_id, user_id)): Path<(String, String)>,
) -> Result<Json<DeleteChannelResponseDto>, ApiError> {
    let channel_id: ChannelId = parse_id(&channel_id, "channel ID")?;
    let user_id: UserId = parse_id(&user_id, "user ID")?;

    let channel = state
        .delete_channel_usecase
        .execute(channel_id, user_id)
        .await?;

    Ok(Json(DeleteChannelResponseDto {
        message: format!("Channel '{}' deleted successfully", channel.name),
        channel_id: channel.id.value(),
    }))
}

/// GET /api/channels/{channel_id}/messages
pub async fn get_message_history(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<String>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let channel_id: ChannelId = parse_id(&channel_id, "channel ID")?;
    let history = state
        .get_message_history_usecase
        .execute(channel_id)
        .await?;

    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// GET /api/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    match state.health_check_usecase.execute().await {
        HealthStatus::Healthy { version } => Json(HealthCheckResponseDto {
            status: "healthy".to_string(),
            error: None,
            version,
        })
        .into_response(),
        HealthStatus::Unhealthy { version, error } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthCheckResponseDto {
                status: "unhealthy".to_string(),
                error: Some(error),
                version,
            }),
        )
            .into_response(),
    }
}
