//! Authentication-related models

use crate::validation::FieldSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

impl FieldSource for SignupRequest {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => Some(&self.email),
            "first_name" => Some(&self.first_name),
            "last_name" => Some(&self.last_name),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

/// Signup response
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: super::user::UserResponse,
}

/// Signin request
#[derive(Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl FieldSource for SigninRequest {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

/// Signin response
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: super::user::UserResponse,
}

/// Change password request
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    /// 可选的确认字段，提供时必须与 new_password 一致
    pub new_password_confirmation: Option<String>,
}

impl FieldSource for ChangePasswordRequest {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => Some(&self.email),
            "current_password" => Some(&self.current_password),
            "new_password" => Some(&self.new_password),
            "new_password_confirmation" => self.new_password_confirmation.as_deref(),
            _ => None,
        }
    }
}

/// 通用消息响应
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
