//! HTTP 处理器
//!
//! - `events`: 订阅/发布/健康检查
//! - `chat`: 模型流中继

pub mod chat;
pub mod events;
