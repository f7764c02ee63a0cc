//! 请求/响应数据模型
//!
//! - `chat`: 聊天补全请求（OpenAI 格式）及其形状校验
//! - `event`: 广播事件及发布请求/确认

pub mod chat;
pub mod event;

pub use chat::{ChatRequest, Message};
pub use event::{Event, PublishAck, PublishRequest};
