//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::{extract_token, AuthContext},
    error::AppError,
    middleware::AppState,
    models::{auth::*, user::UserResponse},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 注册
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;

    let user = state.auth_service.signup(req).await?;

    Ok(Json(SignupResponse {
        message: "User added successfully".to_string(),
        user: UserResponse::from(user),
    }))
}

/// 登录
pub async fn signin(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;

    let response = state.auth_service.signin(req).await?;

    Ok(Json(response))
}

/// 登出
///
/// 不经过会话中间件：未携带令牌、令牌已失效或未知时同样返回成功。
pub async fn signout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = extract_token(&headers) {
        state.auth_service.signout(&token).await?;
    }

    Ok(Json(MessageResponse::new("Signed out successfully")))
}

/// 修改密码
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;

    state.auth_service.change_password(req).await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// 获取当前用户信息
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.current_user(auth_context.user_id).await?;

    Ok(Json(UserResponse::from(user)))
}
