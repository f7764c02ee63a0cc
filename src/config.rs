//! 服务配置
//!
//! 所有配置项通过环境变量读取，未设置时使用默认值：
//!
//! | 变量 | 默认值 | 说明 |
//! |------|--------|------|
//! | `RELAYCAST_HOST` | `127.0.0.1` | 监听地址 |
//! | `RELAYCAST_PORT` | `8787` | 监听端口 |
//! | `RELAYCAST_UPSTREAM_URL` | `https://api.openai.com` | 模型后端基础 URL |
//! | `RELAYCAST_API_KEY` | （无） | 模型后端 API Key |
//! | `RELAYCAST_DEFAULT_MODEL` | `gpt-4o-mini` | 默认模型 |
//! | `RELAYCAST_TOOL_MODEL` | （无） | 请求带 tools 时改用的模型 |
//! | `RELAYCAST_HEARTBEAT_SECS` | `2` | 心跳间隔（0 表示禁用心跳） |

use crate::error::RelayError;
use std::net::SocketAddr;
use std::time::Duration;

/// 服务配置
#[derive(Debug, Clone)]
pub struct Config {
    /// 监听地址
    pub bind_addr: SocketAddr,
    /// 模型后端基础 URL（不含路径）
    pub upstream_base_url: String,
    /// 模型后端 API Key
    pub upstream_api_key: Option<String>,
    /// 默认模型
    pub default_model: String,
    /// 请求带 tools 时改用的模型（未设置时沿用所选模型）
    pub tool_model: Option<String>,
    /// 心跳间隔，`None` 表示禁用
    pub heartbeat_interval: Option<Duration>,
    /// 单个订阅者的发送缓冲区容量（满即视为慢速订阅者并断开）
    pub subscriber_buffer: usize,
    /// 请求体大小上限（字节）
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 8787).into(),
            upstream_base_url: "https://api.openai.com".to_string(),
            upstream_api_key: None,
            default_model: "gpt-4o-mini".to_string(),
            tool_model: None,
            heartbeat_interval: Some(Duration::from_secs(2)),
            subscriber_buffer: 64,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, RelayError> {
        let mut config = Self::default();

        let host = env_or("RELAYCAST_HOST", "127.0.0.1");
        let port: u16 = env_or("RELAYCAST_PORT", "8787")
            .parse()
            .map_err(|e| RelayError::Config(format!("RELAYCAST_PORT 无效: {}", e)))?;
        config.bind_addr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| RelayError::Config(format!("监听地址无效: {}", e)))?;

        if let Ok(url) = std::env::var("RELAYCAST_UPSTREAM_URL") {
            config.upstream_base_url = url.trim_end_matches('/').to_string();
        }
        config.upstream_api_key = std::env::var("RELAYCAST_API_KEY").ok();
        if let Ok(model) = std::env::var("RELAYCAST_DEFAULT_MODEL") {
            config.default_model = model;
        }
        config.tool_model = std::env::var("RELAYCAST_TOOL_MODEL").ok();

        let heartbeat_secs: u64 = env_or("RELAYCAST_HEARTBEAT_SECS", "2")
            .parse()
            .map_err(|e| RelayError::Config(format!("RELAYCAST_HEARTBEAT_SECS 无效: {}", e)))?;
        config.heartbeat_interval = if heartbeat_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(heartbeat_secs))
        };

        Ok(config)
    }

    /// 聊天补全的上游完整 URL
    pub fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.upstream_base_url)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind_addr.port(), 8787);
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.heartbeat_interval, Some(Duration::from_secs(2)));
        assert!(config.tool_model.is_none());
    }

    #[test]
    fn test_chat_completions_url() {
        let config = Config {
            upstream_base_url: "https://example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.chat_completions_url(),
            "https://example.com/v1/chat/completions"
        );
    }
}
