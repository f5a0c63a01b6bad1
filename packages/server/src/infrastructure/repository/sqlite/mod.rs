//! SQLite Repository 実装
//!
//! ドメイン層が定義する Repository trait を sqlx + SQLite で実装します。
//! スキーマは `migrations/` に置かれ、接続時に埋め込みマイグレーションとして適用されます。
//!
//! ```text
//! DB Row (`*Row`, sqlx::FromRow) → ドメインモデル
//! ```

mod channel;
mod message;
mod user;

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::domain::{HealthProbe, RepositoryError};

pub use channel::SqliteChannelRepository;
pub use message::SqliteMessageRepository;
pub use user::SqliteUserRepository;

/// ロック待ちの上限
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// データベースに接続し、マイグレーションを適用する
///
/// ファイルが存在しなければ作成する。
pub async fn connect(database_url: &str) -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(database_error)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(database_error)?;

    migrate(&pool).await?;
    tracing::info!("Connected to database: {}", database_url);
    Ok(pool)
}

/// インメモリ DB に接続する（テスト用）
///
/// インメモリ DB は接続ごとに別物になるため、接続は 1 本に固定して
/// 破棄されないようにしている。
pub async fn connect_in_memory() -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(database_error)?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(database_error)?;

    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("migration failed: {}", e)))
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

/// sqlx のエラーをドメインのエラーに変換する
///
/// 一意制約違反は `Conflict`、外部キー制約違反は `NotFound` になる。
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => RepositoryError::NotFound,
        _ => database_error(e),
    }
}

/// DB 上の ID をドメインの ID に変換できなかった場合のエラー
pub(crate) fn corrupt_row(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Database(format!("invalid row: {}", e))
}

/// `SELECT 1` による疎通確認
pub struct SqliteHealthProbe {
    pool: SqlitePool,
}

impl SqliteHealthProbe {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for SqliteHealthProbe {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(database_error)
    }
}
