//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use account_auth::{
    clock::{Clock, ManualClock},
    config::{AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig},
    db,
    middleware::AppState,
};
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;

/// 会话有效期（测试用）
pub const TEST_SESSION_TTL_SECS: u64 = 3600;

/// 创建测试配置
/// 使用最低的 Argon2 工作因子，避免测试变慢
pub fn create_test_config() -> AppConfig {
    let database_url = std::env::var("TEST_DATABASE_URL").ok().map(Secret::new);

    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: database_url,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            session_ttl_secs: TEST_SESSION_TTL_SECS,
            password_min_length: 6,
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        },
    }
}

/// 创建基于内存存储的测试应用状态，返回可手动推进的时钟
pub fn create_test_app_state() -> (Arc<AppState>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let state = AppState::in_memory(&create_test_config(), clock.clone() as Arc<dyn Clock>)
        .expect("Failed to create test app state");
    (Arc::new(state), clock)
}

/// 初始化测试数据库（需要 TEST_DATABASE_URL）
pub async fn setup_test_db(config: &AppConfig) -> PgPool {
    let pool = db::create_pool(&config.database)
        .await
        .expect("Failed to create test database pool");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    cleanup_test_db(&pool).await;

    pool
}

/// 清理测试数据
pub async fn cleanup_test_db(pool: &PgPool) {
    sqlx::query("TRUNCATE TABLE sessions, users CASCADE")
        .execute(pool)
        .await
        .expect("Failed to cleanup test database");
}

/// 发送 JSON 请求，返回状态与响应体
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (Response<Body>, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (Response::from_parts(parts, Body::empty()), json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_config() {
        let config = create_test_config();
        assert_eq!(config.server.addr, "127.0.0.1:0");
        assert_eq!(config.security.password_min_length, 6);
        assert!(config.validate().is_ok());
    }
}
