//! 凭据服务：密码哈希、校验、注册与修改密码

use crate::{
    auth::password::CredentialHasher,
    clock::Clock,
    error::AppError,
    models::user::{normalize_email, User},
    repository::UserStore,
};
use std::sync::Arc;

/// 邮箱不存在时参与校验的占位密码
const DUMMY_PASSWORD: &str = "account-auth-placeholder-password";

pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
    /// 与真实哈希使用相同工作因子，邮箱不存在时也执行一次完整校验
    dummy_hash: Arc<str>,
}

impl CredentialVerifier {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?.into();

        Ok(Self {
            users,
            hasher,
            clock,
            dummy_hash,
        })
    }

    /// 哈希密码（在阻塞线程池中执行，避免占用异步工作线程）
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// 校验密码，哈希格式错误或任务失败时返回 false
    pub async fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();

        match tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash)).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }

    /// 校验邮箱与密码，成功时返回用户
    ///
    /// 邮箱不存在时仍对占位哈希执行一次校验，两种失败的耗时一致。
    pub async fn check(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.verify(password, &self.dummy_hash).await;
            tracing::info!(%email, "Credential check failed");
            return Err(AppError::InvalidCredentials);
        };

        if !self.verify(password, &user.password_hash).await {
            tracing::info!(%email, user_id = %user.id, "Credential check failed");
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    /// 创建用户
    pub async fn create_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let email = normalize_email(email);
        let first_name = first_name.trim();
        let last_name = last_name.trim();

        if email.is_empty() || first_name.is_empty() || last_name.is_empty() || password.is_empty()
        {
            return Err(AppError::InvalidInput(
                "email, first_name, last_name and password are required".to_string(),
            ));
        }

        // 先查一次可以省掉一次慢哈希；真正的唯一性由存储的插入保证
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }

        let password_hash = self.hash(password).await?;
        let user = User::new(
            email,
            first_name.to_string(),
            last_name.to_string(),
            password_hash,
            self.clock.now(),
        );

        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, email = %user.email, "User created");

        Ok(user)
    }

    /// 修改密码：先校验邮箱与当前密码，失败时不做任何修改
    pub async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if new_password.is_empty() {
            return Err(AppError::InvalidInput("new_password is required".to_string()));
        }

        let mut user = self.check(email, current_password).await?;
        let user_id = user.id;

        user.password_hash = self.hash(new_password).await?;
        user.updated_at = self.clock.now();

        // 版本不匹配说明期间有并发修改，当前密码可能已失效
        if !self.users.update(&user).await? {
            tracing::warn!(%user_id, "Password change lost a concurrent update");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(%user_id, "Password changed");

        Ok(())
    }
}
