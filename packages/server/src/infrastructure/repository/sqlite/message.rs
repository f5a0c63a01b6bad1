//! SQLite Message Repository 実装

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::domain::{ChannelId, HistoryEntry, MessageRepository, RepositoryError, UserId};

use super::{corrupt_row, map_sqlx_error};

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    channel_id: i64,
    user_id: i64,
    username: String,
    content: String,
    created_at: NaiveDateTime,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = RepositoryError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            channel_id: ChannelId::new(row.channel_id).map_err(corrupt_row)?,
            user_id: UserId::new(row.user_id).map_err(corrupt_row)?,
            username: row.username,
            content: row.content,
            created_at: row.created_at.and_utc(),
        })
    }
}

pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn persist_chat_message(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO messages (channel_id, user_id, content) VALUES (?, ?, ?)")
            .bind(channel_id.value())
            .bind(user_id.value())
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    /// 直近 `limit` 件を古い順で返す
    async fn history(
        &self,
        channel_id: ChannelId,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT m.id, m.channel_id, m.user_id, u.username, m.content, m.created_at
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE m.channel_id = ?
            ORDER BY m.id DESC
            LIMIT ?
            "#,
        )
        .bind(channel_id.value())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().rev().map(HistoryEntry::try_from).collect()
    }
}
