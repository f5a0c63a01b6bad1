//! Shared application state.

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::{
    config::PumpConfig,
    domain::{
        ChannelRepository, HealthProbe, MessageRepository, PasswordHasher, UserRepository,
    },
    infrastructure::hub::{Hub, HubGate},
    usecase::{
        ConnectParticipantUseCase, CreateChannelUseCase, CreateUserUseCase, DeleteChannelUseCase,
        GetChannelsUseCase, GetMessageHistoryUseCase, HealthCheckUseCase, LoginUseCase,
        SendMessageUseCase,
    },
};

/// Repository 群（Infrastructure 層の実装を注入する）
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub channels: Arc<dyn ChannelRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub health: Arc<dyn HealthProbe>,
}

/// Runtime settings taken from the configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pump: PumpConfig,
    pub messages_limit: i64,
    pub app_version: String,
}

pub struct AppState {
    /// The process-wide hub, started on the first WebSocket request
    pub hub: HubGate,
    pub pump: PumpConfig,
    /// 接続ごとに SendMessageUseCase を組み立てるために保持
    messages: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,

    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub create_user_usecase: Arc<CreateUserUseCase>,
    pub login_usecase: Arc<LoginUseCase>,
    pub get_channels_usecase: Arc<GetChannelsUseCase>,
    pub create_channel_usecase: Arc<CreateChannelUseCase>,
    pub delete_channel_usecase: Arc<DeleteChannelUseCase>,
    pub get_message_history_usecase: Arc<GetMessageHistoryUseCase>,
    pub health_check_usecase: Arc<HealthCheckUseCase>,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        settings: Settings,
    ) -> Self {
        let Repositories {
            users,
            channels,
            messages,
            health,
        } = repositories;

        Self {
            hub: HubGate::new(clock.clone()),
            pump: settings.pump,
            messages: messages.clone(),
            clock: clock.clone(),
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                users.clone(),
                channels.clone(),
                clock,
            )),
            create_user_usecase: Arc::new(CreateUserUseCase::new(users.clone(), hasher.clone())),
            login_usecase: Arc::new(LoginUseCase::new(users.clone(), hasher)),
            get_channels_usecase: Arc::new(GetChannelsUseCase::new(channels.clone())),
            create_channel_usecase: Arc::new(CreateChannelUseCase::new(channels.clone(), users)),
            delete_channel_usecase: Arc::new(DeleteChannelUseCase::new(channels)),
            get_message_history_usecase: Arc::new(GetMessageHistoryUseCase::new(
                messages,
                settings.messages_limit,
            )),
            health_check_usecase: Arc::new(HealthCheckUseCase::new(health, settings.app_version)),
        }
    }

    /// Message pipeline of one connection, broadcasting through `hub`.
    pub fn send_message_usecase(&self, hub: &Hub) -> SendMessageUseCase {
        SendMessageUseCase::new(
            self.messages.clone(),
            Arc::new(hub.clone()),
            self.clock.clone(),
            self.pump.persist_timeout,
        )
    }
}
