//! OpenAI SSE 流解析器
//!
//! 解析 OpenAI 兼容 API 的 Server-Sent Events 流。
//!
//! 上游数据块按任意边界到达，可能在一行 SSE 中间截断；解析器持有
//! 滚动缓冲，只在凑齐完整一行后解码。按行切分后再做 UTF-8 转换，
//! 避免多字节字符跨块截断的问题。

use crate::error::RelayError;
use crate::stream::events::StreamEvent;
use crate::stream::parsers::DeltaParser;
use serde_json::Value;

/// OpenAI SSE 流解析器
#[derive(Debug, Default)]
pub struct OpenAiSseParser {
    /// 滚动缓冲：尚未凑齐完整一行的字节
    buffer: Vec<u8>,
    /// 是否已输出结束事件
    done: bool,
}

impl OpenAiSseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析一行完整的 SSE 数据
    fn parse_line(&mut self, line: &[u8]) -> Result<Vec<StreamEvent>, RelayError> {
        let line = std::str::from_utf8(line)
            .map_err(|e| RelayError::Decode(format!("SSE 行不是合法的 UTF-8: {}", e)))?;
        let line = line.trim_end_matches('\r');

        if line.is_empty() || line.starts_with(':') {
            return Ok(Vec::new());
        }

        if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            if data == "[DONE]" {
                return Ok(self.emit_done(None));
            }
            return self.parse_chunk(data);
        }

        // 其他 SSE 字段（event: / id: / retry:）不携带增量，跳过
        if line.contains(':') {
            return Ok(Vec::new());
        }

        Err(RelayError::Decode(format!("不是合法的 SSE 行: {}", line)))
    }

    /// 解析一个 chat.completion.chunk JSON
    fn parse_chunk(&mut self, data: &str) -> Result<Vec<StreamEvent>, RelayError> {
        let json: Value = serde_json::from_str(data)
            .map_err(|e| RelayError::Decode(format!("chunk JSON 解析失败: {}", e)))?;

        let mut events = Vec::new();

        let choice = match json.get("choices").and_then(|c| c.as_array()) {
            Some(choices) if !choices.is_empty() => &choices[0],
            _ => return Ok(events),
        };

        if let Some(delta) = choice.get("delta") {
            if let Some(text) = delta.get("content").and_then(|c| c.as_str()) {
                if !text.is_empty() {
                    events.push(StreamEvent::TextDelta {
                        text: text.to_string(),
                    });
                }
            }

            if let Some(tool_calls) = delta.get("tool_calls").and_then(|tc| tc.as_array()) {
                for tc in tool_calls {
                    let index = tc.get("index").and_then(|i| i.as_u64()).unwrap_or(0) as usize;
                    let id = tc.get("id").and_then(|i| i.as_str()).map(str::to_string);
                    let name = tc
                        .get("function")
                        .and_then(|f| f.get("name"))
                        .and_then(|n| n.as_str())
                        .map(str::to_string);
                    let arguments = tc
                        .get("function")
                        .and_then(|f| f.get("arguments"))
                        .and_then(|a| a.as_str())
                        .map(str::to_string);
                    events.push(StreamEvent::ToolCallDelta {
                        index,
                        id,
                        name,
                        arguments,
                    });
                }
            }
        }

        if let Some(reason) = choice.get("finish_reason").and_then(|f| f.as_str()) {
            events.extend(self.emit_done(Some(reason.to_string())));
        }

        Ok(events)
    }

    /// 输出结束事件（至多一次）
    fn emit_done(&mut self, finish_reason: Option<String>) -> Vec<StreamEvent> {
        if self.done {
            return Vec::new();
        }
        self.done = true;
        vec![StreamEvent::Done { finish_reason }]
    }
}

impl DeltaParser for OpenAiSseParser {
    fn feed(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>, RelayError> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            events.extend(self.parse_line(&line[..line.len() - 1])?);
        }
        Ok(events)
    }

    fn finish(&mut self) -> Result<Vec<StreamEvent>, RelayError> {
        if self.buffer.iter().all(|b| b.is_ascii_whitespace()) {
            self.buffer.clear();
            return Ok(Vec::new());
        }
        // 上游没有以换行收尾，把残留数据当最后一行处理
        let line = std::mem::take(&mut self.buffer);
        self.parse_line(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_delta() {
        let mut parser = OpenAiSseParser::new();
        let events = parser
            .feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n")
            .unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta {
                text: "Hello".to_string()
            }]
        );
    }

    #[test]
    fn test_split_across_chunks() {
        let mut parser = OpenAiSseParser::new();
        // 一行 SSE 被任意截断成两个数据块
        let events = parser
            .feed(b"data: {\"choices\":[{\"delta\":{\"cont")
            .unwrap();
        assert!(events.is_empty());

        let events = parser.feed(b"ent\":\"Hi\"}}]}\n\n").unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta {
                text: "Hi".to_string()
            }]
        );
    }

    #[test]
    fn test_multibyte_split() {
        let mut parser = OpenAiSseParser::new();
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"你好\"}}]}\n".as_bytes();
        // 在多字节字符中间切开
        let cut = line.len() - 10;
        assert!(parser.feed(&line[..cut]).unwrap().is_empty());
        let events = parser.feed(&line[cut..]).unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta {
                text: "你好".to_string()
            }]
        );
    }

    #[test]
    fn test_done_signal() {
        let mut parser = OpenAiSseParser::new();
        let events = parser.feed(b"data: [DONE]\n\n").unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::Done {
                finish_reason: None
            }]
        );
        // 重复的 [DONE] 不再产生事件
        assert!(parser.feed(b"data: [DONE]\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_finish_reason_then_done() {
        let mut parser = OpenAiSseParser::new();
        let events = parser
            .feed(b"data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\ndata: [DONE]\n\n")
            .unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::Done {
                finish_reason: Some("stop".to_string())
            }]
        );
    }

    #[test]
    fn test_tool_call_delta() {
        let mut parser = OpenAiSseParser::new();
        let events = parser
            .feed(b"data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"function\":{\"name\":\"lookup\",\"arguments\":\"{\\\"q\\\":\"}}]}}]}\n")
            .unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::ToolCallDelta {
                index: 0,
                id: Some("call_1".to_string()),
                name: Some("lookup".to_string()),
                arguments: Some("{\"q\":".to_string()),
            }]
        );
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let mut parser = OpenAiSseParser::new();
        let result = parser.feed(b"data: {not json}\n");
        assert!(matches!(result, Err(RelayError::Decode(_))));
    }

    #[test]
    fn test_ignores_event_and_comment_lines() {
        let mut parser = OpenAiSseParser::new();
        let events = parser
            .feed(b": keep-alive\nevent: message\nid: 3\n\n")
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_finish_flushes_remainder() {
        let mut parser = OpenAiSseParser::new();
        // 最后一行没有换行收尾
        assert!(parser
            .feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}")
            .unwrap()
            .is_empty());
        let events = parser.finish().unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta {
                text: "tail".to_string()
            }]
        );
    }
}
