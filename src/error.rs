//! 错误类型
//!
//! 定义核心组件的统一错误分类。
//!
//! 处理原则：
//! - 流式传输开始前的错误 → 同步返回 HTTP 错误状态
//! - 流式传输开始后的错误 → 在流内发送 `event: error` 事件
//! - 订阅者/客户端断开 → 仅做内部清理，不向任何一方报告错误

use thiserror::Error;

/// 中继错误
#[derive(Error, Debug)]
pub enum RelayError {
    /// 请求格式错误（在任何流打开之前检测）
    #[error("请求格式错误: {0}")]
    InvalidRequest(String),

    /// 上游连接或传输失败
    #[error("上游请求失败: {0}")]
    Upstream(String),

    /// 上游返回非 2xx 状态
    #[error("上游返回错误状态 {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// 上游数据块无法解析为标准增量
    ///
    /// 对 Relay Session 是致命的：帧边界一旦丢失，流无法安全继续。
    #[error("流解码失败: {0}")]
    Decode(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}
