//! 标准增量事件类型
//!
//! 定义流式转发的中间表示，用于解耦解析器 (parsers) 和生成器 (generators)：
//!
//! - Parsers 输出 `StreamEvent`
//! - Generators 消费 `StreamEvent` 生成客户端格式
//!
//! 每个事件对应上游的一个增量单元，管道内最多缓冲一个单元。

use serde::{Deserialize, Serialize};

/// 标准增量事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// 文本内容增量
    TextDelta {
        /// 文本片段
        text: String,
    },

    /// 工具调用增量
    ///
    /// 同一工具调用的多个增量通过 `index` 关联；`id` 与 `name`
    /// 仅在首个增量出现，后续增量只携带参数片段。
    ToolCallDelta {
        /// 工具调用在列表中的索引
        index: usize,
        /// 工具调用 ID（仅首个增量）
        id: Option<String>,
        /// 工具名称（仅首个增量）
        name: Option<String>,
        /// 参数增量（部分 JSON 字符串）
        arguments: Option<String>,
    },

    /// 流结束
    Done {
        /// 停止原因（stop / tool_calls / length 等）
        finish_reason: Option<String>,
    },
}

impl StreamEvent {
    /// 是否为结束事件
    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done { .. })
    }
}
