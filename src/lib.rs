//! relaycast — 课程聊天应用的实时事件中继
//!
//! 两个独立组合的核心组件，共享同一套托管输出流的设计：
//!
//! - **连接注册与广播中心** (`hub`)：维护所有打开的 SSE 订阅者，
//!   把每个发布的事件扇出给全部订阅者
//! - **模型流中继** (`relay`)：把一条上游的逐 token 补全流重新编码为
//!   客户端可见的增量流
//!
//! `stream` 层提供两者共用的帧编码与上游解码；`server` 层暴露 HTTP
//! 端点。事件不落盘、不回放，设计面向单进程部署。

pub mod config;
pub mod error;
pub mod hub;
pub mod models;
pub mod relay;
pub mod server;
pub mod stream;

pub use config::Config;
pub use error::RelayError;
