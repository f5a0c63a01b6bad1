//! PasswordHasher trait 定義

use async_trait::async_trait;

use super::PasswordError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// `password` が `hash` と一致すれば `true`
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}
