//! 上游流格式解析器
//!
//! 解析模型后端的流式响应格式，输出统一的 `StreamEvent`。
//!
//! # 支持的格式
//!
//! - OpenAI SSE (`openai_sse`)
//!
//! 新增供应商时实现 `DeltaParser` 即可，Relay 管道不变。

pub mod openai_sse;

pub use openai_sse::OpenAiSseParser;

use crate::error::RelayError;
use crate::stream::events::StreamEvent;

/// 上游增量解析接口
///
/// 实现者持有跨数据块的滚动缓冲；一个数据块可能产生零个或多个事件。
/// 解码失败对 Relay Session 是致命的，调用方必须终止流。
pub trait DeltaParser: Send {
    /// 处理一个上游字节块
    fn feed(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>, RelayError>;

    /// 上游流结束时刷出缓冲中的残留数据
    fn finish(&mut self) -> Result<Vec<StreamEvent>, RelayError>;
}
