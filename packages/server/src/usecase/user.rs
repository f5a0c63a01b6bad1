//! UseCase: ユーザー登録・ログイン

use std::sync::Arc;

use crate::domain::{PasswordHasher, RepositoryError, StoredUser, UserRepository};

use super::error::UserError;

/// ユーザー登録のユースケース
pub struct CreateUserUseCase {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl CreateUserUseCase {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// パスワードをハッシュ化してユーザーを作成する
    pub async fn execute(&self, username: &str, password: &str) -> Result<StoredUser, UserError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(UserError::EmptyCredentials);
        }

        let password_hash = self.hasher.hash(password).await?;

        let user = self
            .users
            .create_user(username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => UserError::UsernameTaken,
                other => UserError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User '{}' registered", user.username);
        Ok(user)
    }
}

/// ログインのユースケース
pub struct LoginUseCase {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl LoginUseCase {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    pub async fn execute(&self, username: &str, password: &str) -> Result<StoredUser, UserError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(UserError::EmptyCredentials);
        }

        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(UserError::Repository)?
            .ok_or(UserError::NotFound)?;

        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }
}
