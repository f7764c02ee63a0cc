//! 流式处理层
//!
//! 提供统一的流式数据处理能力，包括：
//! - 标准增量事件定义 (events)
//! - 上游流格式解析 (parsers)
//! - 客户端流格式生成 (generators)
//! - 端到端转发管道 (pipeline)
//!
//! # 架构设计
//!
//! ```text
//! 上游字节流 ──> [Parser] ──> StreamEvent ──> [Generator] ──> 客户端 SSE
//! ```
//!
//! 更换上游供应商只需实现新的 `DeltaParser`，管道与生成器不变。

pub mod events;
pub mod generators;
pub mod parsers;
pub mod pipeline;

pub use events::StreamEvent;
pub use generators::{data_frame, ClientSseGenerator};
pub use parsers::{DeltaParser, OpenAiSseParser};
pub use pipeline::relay_sse_stream;
