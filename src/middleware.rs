//! HTTP 中间件
//! 应用状态与请求追踪

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    clock::{Clock, SystemClock},
    config::AppConfig,
    error::AppError,
    repository::{MemoryTokenStore, MemoryUserStore, PgTokenStore, PgUserStore},
    services::AuthService,
};

/// 应用状态
///
/// 服务以 Arc 共享，Clone 只是指针拷贝
#[derive(Clone)]
pub struct AppState {
    /// 使用内存存储时为 None
    pub db: Option<PgPool>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// 基于 PostgreSQL 存储构建
    pub fn with_postgres(config: &AppConfig, db: PgPool) -> Result<Self, AppError> {
        let auth_service = AuthService::new(
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgTokenStore::new(db.clone())),
            Arc::new(SystemClock),
            &config.security,
        )?;

        Ok(Self {
            db: Some(db),
            auth_service: Arc::new(auth_service),
        })
    }

    /// 基于内存存储构建，进程退出后数据丢失
    pub fn in_memory(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let auth_service = AuthService::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryTokenStore::new()),
            clock,
            &config.security,
        )?;

        Ok(Self {
            db: None,
            auth_service: Arc::new(auth_service),
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!(
            "http_requests_total",
            "method" => method.clone(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            path = %path,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中回传 trace_id 与 request_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
