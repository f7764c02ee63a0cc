//! 客户端流格式生成器
//!
//! 将内部事件编码为客户端可见的 SSE 帧。帧格式工具同时被
//! 广播 Hub 和 Relay 管道使用。

pub mod client_sse;

pub use client_sse::ClientSseGenerator;

use bytes::Bytes;
use serde_json::Value;

/// 编码一个 `data: <JSON>\n\n` 帧
pub fn data_frame(value: &Value) -> Bytes {
    Bytes::from(format!("data: {}\n\n", value))
}

/// 编码一个带事件名的帧（`event: <name>\ndata: <JSON>\n\n`）
pub fn event_frame(name: &str, value: &Value) -> Bytes {
    Bytes::from(format!("event: {}\ndata: {}\n\n", name, value))
}

/// 流正常结束的终止帧
pub fn done_frame() -> Bytes {
    Bytes::from_static(b"data: [DONE]\n\n")
}

/// 流内错误的终止帧
///
/// 状态码在流开始后无法更改，错误只能在流内表达。
pub fn error_frame(message: &str) -> Bytes {
    event_frame(
        "error",
        &serde_json::json!({"error": {"message": message}}),
    )
}
