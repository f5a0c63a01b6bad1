//! SQLite User Repository 実装

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::domain::{RepositoryError, StoredUser, UserId, UserRepository};

use super::{corrupt_row, map_sqlx_error};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    created_at: NaiveDateTime,
}

impl TryFrom<UserRow> for StoredUser {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.id).map_err(corrupt_row)?,
            username: row.username,
            password_hash: row.password,
            created_at: row.created_at.and_utc(),
        })
    }
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<StoredUser, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password)
            VALUES (?, ?)
            RETURNING id, username, password, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::debug!(user_id = row.id, "Created user '{}'", row.username);
        row.try_into()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<StoredUser>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, created_at FROM users WHERE id = ?",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .map(StoredUser::try_from)
        .transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .map(StoredUser::try_from)
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repository::sqlite::connect_in_memory;

    async fn repository() -> SqliteUserRepository {
        SqliteUserRepository::new(connect_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        // テスト項目: 作成したユーザーを ID とユーザー名で取得できる
        // given (前提条件):
        let repo = repository().await;

        // when (操作):
        let created = repo.create_user("alice", "$2b$04$hash").await.unwrap();
        let by_id = repo.find_by_id(created.id).await.unwrap();
        let by_name = repo.find_by_username("alice").await.unwrap();

        // then (期待する結果):
        assert_eq!(created.username, "alice");
        assert_eq!(created.password_hash, "$2b$04$hash");
        assert_eq!(by_id, Some(created.clone()));
        assert_eq!(by_name, Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        // テスト項目: 同じユーザー名での作成は Conflict になる
        // given (前提条件):
        let repo = repository().await;
        repo.create_user("alice", "h1").await.unwrap();

        // when (操作):
        let result = repo.create_user("alice", "h2").await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        // テスト項目: 存在しないユーザーは None を返す
        // given (前提条件):
        let repo = repository().await;

        // when (操作):
        let by_id = repo.find_by_id(UserId::new(42).unwrap()).await.unwrap();
        let by_name = repo.find_by_username("nobody").await.unwrap();

        // then (期待する結果):
        assert!(by_id.is_none());
        assert!(by_name.is_none());
    }
}
