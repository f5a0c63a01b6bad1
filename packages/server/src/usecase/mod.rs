//! UseCase 層
//!
//! ドメイン層の trait だけに依存し、具体的な実装は起動時に注入されます。

pub mod channel;
pub mod connect_participant;
pub mod error;
pub mod health_check;
pub mod message_history;
pub mod send_message;
pub mod user;

pub use channel::{CreateChannelUseCase, DeleteChannelUseCase, GetChannelsUseCase};
pub use connect_participant::ConnectParticipantUseCase;
pub use error::{ChannelError, ConnectError, SendMessageError, UserError};
pub use health_check::{HealthCheckUseCase, HealthStatus};
pub use message_history::GetMessageHistoryUseCase;
pub use send_message::SendMessageUseCase;
pub use user::{CreateUserUseCase, LoginUseCase};
