//! 客户端 SSE 生成器
//!
//! 将 `StreamEvent` 重新编码为客户端的 Chat Completions chunk 流：
//!
//! ```text
//! data: {"id":"chatcmpl-xxx","object":"chat.completion.chunk","created":1234567890,"model":"gpt-4o-mini","choices":[{"index":0,"delta":{"content":"Hello"},"finish_reason":null}]}
//!
//! data: [DONE]
//! ```

use crate::stream::events::StreamEvent;
use crate::stream::generators::data_frame;
use bytes::Bytes;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// 客户端 SSE 生成器
///
/// 每个 Relay Session 一个实例；响应 ID 与时间戳在整个流内保持不变。
#[derive(Debug)]
pub struct ClientSseGenerator {
    /// 响应 ID
    response_id: String,
    /// 模型名称
    model: String,
    /// 创建时间戳
    created: u64,
}

impl ClientSseGenerator {
    /// 创建新的生成器
    pub fn new(model: &str) -> Self {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            response_id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
            model: model.to_string(),
            created,
        }
    }

    /// 获取响应 ID
    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    /// 将 StreamEvent 编码为一个 SSE 帧
    ///
    /// 返回 `None` 表示该事件不产生客户端输出。
    pub fn generate(&self, event: &StreamEvent) -> Option<Bytes> {
        match event {
            StreamEvent::TextDelta { text } => {
                Some(self.chunk(json!({"content": text}), None))
            }

            StreamEvent::ToolCallDelta {
                index,
                id,
                name,
                arguments,
            } => {
                let mut call = json!({"index": index});
                if let Some(id) = id {
                    call["id"] = json!(id);
                    call["type"] = json!("function");
                }
                let mut function = json!({});
                if let Some(name) = name {
                    function["name"] = json!(name);
                }
                if let Some(arguments) = arguments {
                    function["arguments"] = json!(arguments);
                }
                call["function"] = function;
                Some(self.chunk(json!({"tool_calls": [call]}), None))
            }

            StreamEvent::Done { finish_reason } => Some(self.chunk(
                json!({}),
                Some(finish_reason.as_deref().unwrap_or("stop")),
            )),
        }
    }

    /// 构造一个 chat.completion.chunk 帧
    fn chunk(&self, delta: Value, finish_reason: Option<&str>) -> Bytes {
        data_frame(&json!({
            "id": self.response_id,
            "object": "chat.completion.chunk",
            "created": self.created,
            "model": self.model,
            "choices": [{
                "index": 0,
                "delta": delta,
                "finish_reason": finish_reason,
            }],
        }))
    }
}
