//! HTTP 服务
//!
//! 路由：
//! - `GET  /health` — 存活探针
//! - `GET  /v1/events` — SSE 订阅（长连接）
//! - `POST /v1/events` — 发布事件
//! - `POST /v1/chat/completions` — 模型流中继
//!
//! 认证由上游层处理，到达这里的请求视为已授权。

pub mod handlers;

use crate::config::Config;
use crate::error::RelayError;
use crate::hub::Hub;
use crate::relay::ModelRelay;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::limit::RequestBodyLimitLayer;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub relay: ModelRelay,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Result<Self, RelayError> {
        Ok(Self {
            hub: Arc::new(Hub::new(config.subscriber_buffer)),
            relay: ModelRelay::new(Arc::clone(&config))?,
            config,
        })
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_)
            | RelayError::UpstreamStatus { .. }
            | RelayError::Decode(_) => StatusCode::BAD_GATEWAY,
            RelayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(serde_json::json!({"error": {"message": self.to_string()}})),
        )
            .into_response()
    }
}

/// 构建流式响应
///
/// 关闭各级缓存与缓冲，保证每帧立即可见。
pub(crate) fn sse_response(body: Body) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(body)
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": {"message": "Failed to build stream response"}})),
            )
                .into_response()
        })
}

/// 构建路由
pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    Router::new()
        .route("/health", get(handlers::events::health))
        .route(
            "/v1/events",
            get(handlers::events::subscribe).post(handlers::events::publish),
        )
        .route("/v1/chat/completions", post(handlers::chat::chat_completions))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

/// 启动服务并阻塞直至收到退出信号
pub async fn run(config: Config) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config))?;

    let shutdown = CancellationToken::new();
    let heartbeat = config
        .heartbeat_interval
        .map(|interval| state.hub.spawn_heartbeat(interval, shutdown.clone()));

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("[SERVER] 监听 {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("[SERVER] 收到退出信号");
        })
        .await?;

    shutdown.cancel();
    if let Some(handle) = heartbeat {
        let _ = handle.await;
    }
    Ok(())
}
