//! 会话服务：签发、验证、撤销会话令牌

use crate::{
    auth::token::{generate_token, hash_token},
    clock::Clock,
    error::AppError,
    models::session::Session,
    repository::TokenStore,
};
use chrono::{DateTime, Utc};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use uuid::Uuid;

/// 两次清理过期会话之间的最短间隔
const PURGE_INTERVAL_SECS: i64 = 300;

/// 新签发的令牌，明文只在此处出现一次
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct SessionTokenIssuer {
    tokens: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    ttl: Option<chrono::Duration>,
    last_purge: Mutex<DateTime<Utc>>,
}

impl SessionTokenIssuer {
    /// `ttl` 为 None 时会话只能通过撤销结束
    pub fn new(tokens: Arc<dyn TokenStore>, clock: Arc<dyn Clock>, ttl: Option<Duration>) -> Self {
        // 超出 chrono 表示范围的有效期按永不过期处理
        let ttl = ttl.and_then(|d| chrono::Duration::from_std(d).ok());
        let last_purge = Mutex::new(clock.now());
        Self {
            tokens,
            clock,
            ttl,
            last_purge,
        }
    }

    /// 签发令牌，存储中只保留其摘要
    pub async fn issue(&self, user_id: Uuid) -> Result<IssuedToken, AppError> {
        let token = generate_token();
        let issued_at = self.clock.now();
        let expires_at = self
            .ttl
            .and_then(|ttl| issued_at.checked_add_signed(ttl));

        let session = Session {
            token_hash: hash_token(&token),
            user_id,
            issued_at,
            expires_at,
        };
        self.tokens.put(&session).await?;

        metrics::counter!("auth_sessions_issued_total").increment(1);
        tracing::debug!(%user_id, "Session issued");

        self.purge_expired_if_due(issued_at).await;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// 验证令牌，返回绑定的用户 ID
    ///
    /// 过期的会话会被顺带删除。
    pub async fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let token_hash = hash_token(token);

        let session = self
            .tokens
            .get(&token_hash)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        if session.is_expired(self.clock.now()) {
            self.tokens.delete(&token_hash).await?;
            metrics::counter!("auth_sessions_expired_total").increment(1);
            tracing::debug!(user_id = %session.user_id, "Session expired");
            return Err(AppError::TokenExpired);
        }

        Ok(session.user_id)
    }

    /// 顺带清理从未再被出示的过期会话，每个间隔最多执行一次
    async fn purge_expired_if_due(&self, now: DateTime<Utc>) {
        if self.ttl.is_none() {
            return;
        }

        {
            let mut last_purge = match self.last_purge.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if now - *last_purge < chrono::Duration::seconds(PURGE_INTERVAL_SECS) {
                return;
            }
            *last_purge = now;
        }

        // 清理失败不影响本次签发
        match self.tokens.purge_expired(now).await {
            Ok(0) => {}
            Ok(purged) => {
                metrics::counter!("auth_sessions_purged_total").increment(purged);
                tracing::debug!(purged, "Expired sessions purged");
            }
            Err(e) => tracing::warn!(error = %e, "Failed to purge expired sessions"),
        }
    }

    /// 撤销令牌，令牌不存在时同样成功
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        if self.tokens.delete(&hash_token(token)).await? {
            metrics::counter!("auth_sessions_revoked_total").increment(1);
            tracing::debug!("Session revoked");
        }

        Ok(())
    }
}
