//! SQLite Channel Repository 実装

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::domain::{Channel, ChannelId, ChannelRepository, RepositoryError, UserId};

use super::{corrupt_row, map_sqlx_error};

const SELECT_CHANNEL: &str = r#"
    SELECT c.id, c.name, c.description, c.created_by, u.username AS created_by_username, c.created_at
    FROM channels c
    JOIN users u ON u.id = c.created_by
"#;

#[derive(Debug, sqlx::FromRow)]
struct ChannelRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_by: i64,
    created_by_username: String,
    created_at: NaiveDateTime,
}

impl TryFrom<ChannelRow> for Channel {
    type Error = RepositoryError;

    fn try_from(row: ChannelRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ChannelId::new(row.id).map_err(corrupt_row)?,
            name: row.name,
            description: row.description,
            created_by: UserId::new(row.created_by).map_err(corrupt_row)?,
            created_by_username: row.created_by_username,
            created_at: row.created_at.and_utc(),
        })
    }
}

pub struct SqliteChannelRepository {
    pool: SqlitePool,
}

impl SqliteChannelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for SqliteChannelRepository {
    async fn list_channels(&self) -> Result<Vec<Channel>, RepositoryError> {
        let rows = sqlx::query_as::<_, ChannelRow>(&format!("{SELECT_CHANNEL} ORDER BY c.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(Channel::try_from).collect()
    }

    async fn find_by_id(&self, id: ChannelId) -> Result<Option<Channel>, RepositoryError> {
        sqlx::query_as::<_, ChannelRow>(&format!("{SELECT_CHANNEL} WHERE c.id = ?"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(Channel::try_from)
            .transpose()
    }

    async fn create_channel(
        &self,
        name: &str,
        description: Option<String>,
        created_by: UserId,
    ) -> Result<Channel, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO channels (name, description, created_by) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .bind(created_by.value())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::debug!(channel_id = id, created_by = %created_by, "Created channel '{}'", name);

        let id = ChannelId::new(id).map_err(corrupt_row)?;
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete_channel(
        &self,
        id: ChannelId,
        created_by: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM channels WHERE id = ? AND created_by = ?")
            .bind(id.value())
            .bind(created_by.value())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
