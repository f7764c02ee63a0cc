//! 聊天补全请求模型
//!
//! 采用 OpenAI Chat Completions 的请求形状。除 `model` 与 `messages` 外的
//! 字段原样透传给上游，不做解释。

use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 一条对话消息
///
/// `content` 保持为松散 JSON：字符串或分段数组都直接透传。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// 角色（system / user / assistant / tool）
    pub role: String,
    /// 消息内容（透传）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

/// 聊天补全请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// 模型名称（未指定时使用配置的默认模型）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// 有序的消息列表
    pub messages: Vec<Message>,
    /// 工具定义（存在时启用 function-calling 路由）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    /// 采样温度（透传）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// 最大输出 token 数（透传）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// 客户端声明的 stream 标志；本服务始终以流式响应
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

impl ChatRequest {
    /// 校验请求形状
    ///
    /// 规则：
    /// - `messages` 非空
    /// - 每条消息的 `role` 非空
    ///
    /// 在打开任何上游连接之前调用，失败直接映射为 400。
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.messages.is_empty() {
            return Err(RelayError::InvalidRequest(
                "messages 不能为空".to_string(),
            ));
        }
        for (i, msg) in self.messages.iter().enumerate() {
            if msg.role.trim().is_empty() {
                return Err(RelayError::InvalidRequest(format!(
                    "messages[{}] 缺少 role",
                    i
                )));
            }
        }
        Ok(())
    }

    /// 请求是否要求 function-calling 语义
    pub fn wants_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(role: &str, content: &str) -> Message {
        Message {
            role: role.to_string(),
            content: Some(json!(content)),
        }
    }

    #[test]
    fn test_validate_ok() {
        let req = ChatRequest {
            model: None,
            messages: vec![message("user", "你好")],
            tools: None,
            temperature: None,
            max_tokens: None,
            stream: true,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_messages() {
        let req = ChatRequest {
            model: None,
            messages: vec![],
            tools: None,
            temperature: None,
            max_tokens: None,
            stream: true,
        };
        assert!(matches!(
            req.validate(),
            Err(RelayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_empty_role() {
        let req = ChatRequest {
            model: None,
            messages: vec![message("", "hi")],
            tools: None,
            temperature: None,
            max_tokens: None,
            stream: true,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_wants_tools() {
        let mut req = ChatRequest {
            model: None,
            messages: vec![message("user", "hi")],
            tools: Some(vec![]),
            temperature: None,
            max_tokens: None,
            stream: true,
        };
        assert!(!req.wants_tools());

        req.tools = Some(vec![json!({"type": "function"})]);
        assert!(req.wants_tools());
    }

    #[test]
    fn test_deserialize_defaults_stream() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert!(req.stream);
        assert!(req.model.is_none());
    }
}
