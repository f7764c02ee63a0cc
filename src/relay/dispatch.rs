//! 上游路由决策
//!
//! 在打开上游连接之前，根据请求字段（模型名、是否要求
//! function-calling）选出上游端点与模型配置。纯同步决策，
//! 无任何副作用，只决定 Relay 将要打开的请求形状。

use crate::config::Config;
use crate::models::ChatRequest;

/// 路由结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRoute {
    /// 上游完整 URL
    pub url: String,
    /// 实际发往上游的模型名
    pub model: String,
    /// 是否透传 tools 字段
    pub with_tools: bool,
}

/// 解析一次请求的上游路由
///
/// 规则：
/// - 模型：请求指定 > 配置默认
/// - 请求带非空 tools 且配置了 `tool_model` 时改用该模型
pub fn resolve(config: &Config, request: &ChatRequest) -> UpstreamRoute {
    let with_tools = request.wants_tools();

    let mut model = request
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.clone());

    if with_tools {
        if let Some(tool_model) = &config.tool_model {
            model = tool_model.clone();
        }
    }

    UpstreamRoute {
        url: config.chat_completions_url(),
        model,
        with_tools,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;
    use serde_json::json;

    fn request(model: Option<&str>, tools: Option<Vec<serde_json::Value>>) -> ChatRequest {
        ChatRequest {
            model: model.map(str::to_string),
            messages: vec![Message {
                role: "user".to_string(),
                content: Some(json!("hi")),
            }],
            tools,
            temperature: None,
            max_tokens: None,
            stream: true,
        }
    }

    #[test]
    fn test_default_model() {
        let config = Config::default();
        let route = resolve(&config, &request(None, None));
        assert_eq!(route.model, config.default_model);
        assert!(!route.with_tools);
        assert!(route.url.ends_with("/v1/chat/completions"));
    }

    #[test]
    fn test_request_model_wins() {
        let config = Config::default();
        let route = resolve(&config, &request(Some("gpt-4o"), None));
        assert_eq!(route.model, "gpt-4o");
    }

    #[test]
    fn test_tool_model_override() {
        let config = Config {
            tool_model: Some("gpt-4o".to_string()),
            ..Default::default()
        };
        let route = resolve(
            &config,
            &request(Some("gpt-4o-mini"), Some(vec![json!({"type": "function"})])),
        );
        assert_eq!(route.model, "gpt-4o");
        assert!(route.with_tools);
    }

    #[test]
    fn test_empty_tools_no_override() {
        let config = Config {
            tool_model: Some("gpt-4o".to_string()),
            ..Default::default()
        };
        let route = resolve(&config, &request(Some("gpt-4o-mini"), Some(vec![])));
        assert_eq!(route.model, "gpt-4o-mini");
        assert!(!route.with_tools);
    }
}
