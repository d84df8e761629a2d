//! User repository (数据库访问层)

use crate::{error::AppError, models::user::*};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// 用户存储
///
/// 邮箱唯一性与并发更新由存储自身的原子性保证。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据已规范化的邮箱查找用户
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// 插入用户，邮箱已存在时返回 `AppError::EmailTaken`
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    /// 以 `user.version` 为期望版本覆盖写入，成功后存储中的版本加一。
    /// 版本不匹配（被并发修改）或用户不存在时返回 false。
    async fn update(&self, user: &User) -> Result<bool, AppError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, password_hash, created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.version)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            // 唯一索引冲突：邮箱已被占用
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, user: &User) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                first_name = $3,
                last_name = $4,
                password_hash = $5,
                updated_at = $6,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(user.id)
        .bind(user.version)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
