//! Session domain models

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 会话记录，以令牌的 SHA-256 摘要为键存储
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Session {
    pub token_hash: String,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// 是否已过期（未设置过期时间的会话永不过期）
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}
