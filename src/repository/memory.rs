//! 内存存储实现
//! 未配置数据库时使用，也用于测试。原子性由 DashMap 的分片锁和 entry API 提供。

use crate::{
    error::AppError,
    models::{session::Session, user::User},
    repository::{TokenStore, UserStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

/// 内存用户存储
#[derive(Default)]
pub struct MemoryUserStore {
    // 以小写邮箱为键，保证大小写不敏感唯一
    by_email: DashMap<String, User>,
    email_by_id: DashMap<Uuid, String>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .by_email
            .get(&email.to_lowercase())
            .map(|u| u.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let Some(email) = self.email_by_id.get(&id).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        self.find_by_email(&email).await
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        match self.by_email.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => Err(AppError::EmailTaken),
            Entry::Vacant(slot) => {
                // 写 id 索引时仍持有邮箱分片的写锁，读者要么看不到用户，要么两条索引都可见
                self.email_by_id.insert(user.id, slot.key().clone());
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, user: &User) -> Result<bool, AppError> {
        let Some(email) = self.email_by_id.get(&user.id).map(|e| e.value().clone()) else {
            return Ok(false);
        };

        // get_mut 持有分片写锁，比较与写入在同一临界区内完成
        let Some(mut stored) = self.by_email.get_mut(&email) else {
            return Ok(false);
        };
        if stored.version != user.version {
            return Ok(false);
        }

        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.password_hash = user.password_hash.clone();
        stored.updated_at = user.updated_at;
        stored.version += 1;

        Ok(true)
    }
}

/// 内存会话存储
#[derive(Default)]
pub struct MemoryTokenStore {
    sessions: DashMap<String, Session>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, session: &Session) -> Result<(), AppError> {
        self.sessions
            .insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.get(token_hash).map(|s| s.value().clone()))
    }

    async fn delete(&self, token_hash: &str) -> Result<bool, AppError> {
        Ok(self.sessions.remove(token_hash).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut purged = 0;
        self.sessions.retain(|_, session| {
            let keep = !session.is_expired(now);
            if !keep {
                purged += 1;
            }
            keep
        });
        Ok(purged)
    }
}
