//! Session repository (会话令牌存储)

use crate::{error::AppError, models::session::Session};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// 活跃会话存储，以令牌摘要为键
///
/// 多个请求会并发签发、验证、撤销令牌，每个操作都必须是单条原子操作。
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// 存储会话
    async fn put(&self, session: &Session) -> Result<(), AppError>;

    /// 根据令牌摘要查找会话
    async fn get(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// 删除会话，返回是否确实删除了记录
    async fn delete(&self, token_hash: &str) -> Result<bool, AppError>;

    /// 删除 `now` 时已过期的会话，返回删除数量
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

pub struct PgTokenStore {
    db: PgPool,
}

impl PgTokenStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn put(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, issued_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.token_hash)
        .bind(session.user_id)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn get(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT token_hash, user_id, issued_at, expires_at FROM sessions WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    async fn delete(&self, token_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE expires_at IS NOT NULL AND expires_at <= $1")
                .bind(now)
                .execute(&self.db)
                .await?;

        Ok(result.rows_affected())
    }
}
