//! 认证服务：注册、登录、登出、修改密码

use crate::{
    auth::password::PasswordHasher,
    clock::Clock,
    config::SecurityConfig,
    error::AppError,
    models::{
        auth::*,
        user::{User, UserResponse},
    },
    repository::{TokenStore, UserStore},
    services::{CredentialVerifier, SessionTokenIssuer},
    validation::AuthRules,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    users: Arc<dyn UserStore>,
    credentials: CredentialVerifier,
    sessions: SessionTokenIssuer,
    rules: AuthRules,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
        config: &SecurityConfig,
    ) -> Result<Self, AppError> {
        let hasher = Arc::new(PasswordHasher::from_config(config)?);

        Ok(Self {
            credentials: CredentialVerifier::new(users.clone(), hasher, clock.clone())?,
            sessions: SessionTokenIssuer::new(tokens, clock, config.session_ttl()),
            users,
            rules: AuthRules::new(config.password_min_length),
        })
    }

    /// 用户注册
    pub async fn signup(&self, req: SignupRequest) -> Result<User, AppError> {
        self.rules.signup.check(&req)?;

        self.credentials
            .create_user(&req.email, &req.first_name, &req.last_name, &req.password)
            .await
    }

    /// 用户登录
    pub async fn signin(&self, req: SigninRequest) -> Result<SigninResponse, AppError> {
        self.rules.signin.check(&req)?;

        let user = self.credentials.check(&req.email, &req.password).await?;
        let issued = self.sessions.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "User signed in");

        Ok(SigninResponse {
            token: issued.token,
            token_type: "Bearer",
            expires_at: issued.expires_at,
            user: UserResponse::from(user),
        })
    }

    /// 登出（撤销会话令牌），未知令牌同样成功
    pub async fn signout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.revoke(token).await
    }

    /// 修改密码
    pub async fn change_password(&self, req: ChangePasswordRequest) -> Result<(), AppError> {
        self.rules.change_password.check(&req)?;

        self.credentials
            .change_password(&req.email, &req.current_password, &req.new_password)
            .await
    }

    /// 验证会话令牌，返回用户 ID
    pub async fn authenticate(&self, token: &str) -> Result<Uuid, AppError> {
        self.sessions.validate(token).await
    }

    /// 根据已验证的用户 ID 获取用户
    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::TokenInvalid)
    }
}
