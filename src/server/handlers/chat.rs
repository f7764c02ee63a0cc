//! 模型流中继处理器

use crate::models::ChatRequest;
use crate::server::{sse_response, AppState};
use axum::{
    body::Body,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

/// `POST /v1/chat/completions` — 流式转发一次补全请求
///
/// 校验失败与上游流开始前的失败以 HTTP 状态返回；流开始后的失败
/// 只能在流内以 `event: error` 表达。
pub async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        tracing::warn!("[CHAT] 请求被拒绝: {}", e);
        return e.into_response();
    }

    match state.relay.open_stream(&request).await {
        Ok(stream) => sse_response(Body::from_stream(stream)),
        Err(e) => {
            tracing::warn!("[CHAT] 上游打开失败: {}", e);
            e.into_response()
        }
    }
}
