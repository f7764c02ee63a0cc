//! 广播事件模型
//!
//! 事件是短暂的：不落盘、不回放。发布时没有订阅者则直接丢弃。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 一个待广播的事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// 逻辑频道（如工作流名称）；`None` 表示默认频道，所有订阅者可见
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// 不透明负载，原样透传
    pub payload: Value,
    /// 发布时间
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// 创建新事件（时间戳取当前时刻）
    pub fn new(channel: Option<String>, payload: Value) -> Self {
        Self {
            channel,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// 创建心跳事件
    ///
    /// 心跳走与普通发布完全相同的广播路径。
    pub fn heartbeat() -> Self {
        Self::new(None, serde_json::json!({"type": "heartbeat"}))
    }
}

/// 发布请求体
#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    /// 逻辑频道
    #[serde(default)]
    pub channel: Option<String>,
    /// 不透明负载
    pub payload: Value,
}

/// 发布确认
#[derive(Debug, Clone, Serialize)]
pub struct PublishAck {
    pub ok: bool,
    /// 成功写入的订阅者数量（0 也是成功）
    pub delivered: usize,
}
