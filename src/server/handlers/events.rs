//! 事件订阅与发布处理器
//!
//! 订阅连接保持打开直到任意一方关闭。客户端断开时响应体被丢弃，
//! `Subscription` 的 Drop 立即把该订阅者从注册表移除——不会留下
//! 孤儿条目。

use crate::models::{Event, PublishAck, PublishRequest};
use crate::server::{sse_response, AppState};
use crate::stream::generators;
use axum::{
    body::Body,
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

/// 订阅参数
#[derive(Debug, Deserialize)]
pub struct SubscribeParams {
    /// 逻辑频道过滤；缺省接收所有事件
    #[serde(default)]
    pub channel: Option<String>,
}

/// `GET /v1/events` — SSE 订阅
pub async fn subscribe(
    State(state): State<AppState>,
    Query(params): Query<SubscribeParams>,
) -> Response {
    let mut subscription = state.hub.subscribe(params.channel);
    let id = subscription.id;

    let body_stream = async_stream::stream! {
        // 首帧确认注册完成
        yield Ok::<Bytes, std::io::Error>(generators::data_frame(
            &json!({"type": "connected", "id": id}),
        ));
        while let Some(frame) = subscription.recv().await {
            yield Ok(frame);
        }
        // recv 返回 None: 广播路径已将该订阅者移除
        tracing::info!("[SSE] 订阅者 {} 的流已结束", id);
    };

    sse_response(Body::from_stream(body_stream))
}

/// `POST /v1/events` — 发布事件
///
/// 无订阅者时事件被丢弃，`delivered` 为 0，仍返回成功。
pub async fn publish(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> impl IntoResponse {
    let event = Event::new(request.channel, request.payload);
    let delivered = state.hub.publish(&event);
    Json(PublishAck {
        ok: true,
        delivered,
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "subscribers": state.hub.subscriber_count(),
    }))
}
