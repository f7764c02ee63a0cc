//! 模型流中继
//!
//! 每个聊天请求恰好对应一个 Relay Session：一条上游连接、一条客户端
//! 连接，互不共享。上游以流式模式打开；每个增量到达后立即重新编码
//! 并写出。客户端断开时响应体被丢弃，上游连接随之取消，不会在无人
//! 接收后继续消费上游。

pub mod dispatch;

pub use dispatch::{resolve, UpstreamRoute};

use crate::config::Config;
use crate::error::RelayError;
use crate::models::ChatRequest;
use crate::stream::{relay_sse_stream, ClientSseGenerator, OpenAiSseParser};
use bytes::Bytes;
use futures::Stream;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// 模型流中继
#[derive(Debug, Clone)]
pub struct ModelRelay {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl ModelRelay {
    /// 创建中继
    ///
    /// 只限制建立连接的超时；响应体是长流, 不设整体超时。
    pub fn new(config: Arc<Config>) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RelayError::Config(format!("HTTP 客户端构建失败: {}", e)))?;
        Ok(Self { client, config })
    }

    /// 打开一个 Relay Session，返回客户端 SSE 字节流
    ///
    /// 调用前请求必须已通过 `ChatRequest::validate`。上游在流开始前
    /// 失败（连接失败或非 2xx）时同步返回错误，由调用方映射为
    /// HTTP 状态；流开始后的失败在流内表达。
    pub async fn open_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<impl Stream<Item = Result<Bytes, std::io::Error>>, RelayError> {
        let route = dispatch::resolve(&self.config, request);
        tracing::info!(
            "[RELAY] 打开上游流, model={} tools={}",
            route.model,
            route.with_tools
        );

        let payload = build_upstream_payload(request, &route);

        let mut upstream = self.client.post(&route.url).json(&payload);
        if let Some(api_key) = &self.config.upstream_api_key {
            upstream = upstream.bearer_auth(api_key);
        }

        let response = upstream
            .send()
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("[RELAY] 上游返回 {}: {}", status, body);
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(relay_sse_stream(
            response.bytes_stream(),
            OpenAiSseParser::new(),
            ClientSseGenerator::new(&route.model),
        ))
    }
}

/// 构造上游请求体
///
/// 强制 `stream: true`; 未路由启用的 tools 不透传。
fn build_upstream_payload(request: &ChatRequest, route: &UpstreamRoute) -> serde_json::Value {
    let mut payload = json!({
        "model": route.model,
        "messages": request.messages,
        "stream": true,
    });
    if route.with_tools {
        if let Some(tools) = &request.tools {
            payload["tools"] = json!(tools);
        }
    }
    if let Some(temperature) = request.temperature {
        payload["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = request.max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    payload
}
