//! UseCase: ヘルスチェック

use std::sync::Arc;

use crate::domain::HealthProbe;

/// ヘルスチェックの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy { version: String },
    Unhealthy { version: String, error: String },
}

pub struct HealthCheckUseCase {
    probe: Arc<dyn HealthProbe>,
    version: String,
}

impl HealthCheckUseCase {
    pub fn new(probe: Arc<dyn HealthProbe>, version: impl Into<String>) -> Self {
        Self {
            probe,
            version: version.into(),
        }
    }

    pub async fn execute(&self) -> HealthStatus {
        match self.probe.ping().await {
            Ok(()) => HealthStatus::Healthy {
                version: self.version.clone(),
            },
            Err(e) => {
                tracing::error!("Health check failed: {}", e);
                HealthStatus::Unhealthy {
                    version: self.version.clone(),
                    error: e.to_string(),
                }
            }
        }
    }
}
