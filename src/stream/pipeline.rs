//! 端到端转发管道
//!
//! 将上游字节流转换为客户端 SSE 字节流：解析 → 标准事件 → 重新编码。
//! 每收到一个上游单元立即转发，管道内最多缓冲一个未凑齐的单元，
//! 逐 token 延迟是设计目标。
//!
//! 管道对上游流类型泛型化，测试可以用脚本化的流直接驱动。
//! 客户端断开时整个流被丢弃，上游连接随之取消。

use crate::stream::events::StreamEvent;
use crate::stream::generators::{self, ClientSseGenerator};
use crate::stream::parsers::DeltaParser;
use bytes::Bytes;
use futures::{Stream, StreamExt};

/// 创建 Relay Session 的客户端字节流
///
/// 终止方式（三选一，不会悬挂）：
/// - 上游正常结束 → 结束 chunk + `data: [DONE]`
/// - 上游传输错误或解码失败 → `event: error` 帧
/// - 客户端断开 → 流被丢弃，上游连接取消
pub fn relay_sse_stream<S, E, P>(
    upstream: S,
    mut parser: P,
    generator: ClientSseGenerator,
) -> impl Stream<Item = Result<Bytes, std::io::Error>>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    P: DeltaParser + 'static,
{
    async_stream::stream! {
        let mut upstream = std::pin::pin!(upstream);
        let mut delivered: usize = 0;

        while let Some(result) = upstream.next().await {
            let bytes = match result {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!("[RELAY] 上游流传输错误: {}", e);
                    yield Ok(generators::error_frame(&e.to_string()));
                    return;
                }
            };

            let events = match parser.feed(&bytes) {
                Ok(events) => events,
                Err(e) => {
                    tracing::error!("[RELAY] 上游数据解码失败: {}", e);
                    yield Ok(generators::error_frame(&e.to_string()));
                    return;
                }
            };

            for event in events {
                if event.is_done() {
                    if let Some(frame) = generator.generate(&event) {
                        yield Ok(frame);
                    }
                    yield Ok(generators::done_frame());
                    tracing::debug!("[RELAY] 上游声明结束, 已转发 {} 个增量", delivered);
                    return;
                }
                if let Some(frame) = generator.generate(&event) {
                    delivered += 1;
                    yield Ok(frame);
                }
            }
        }

        // 上游在未声明结束的情况下走到 EOF：刷出缓冲残留后正常收尾
        match parser.finish() {
            Ok(events) => {
                for event in events {
                    if event.is_done() {
                        break;
                    }
                    if let Some(frame) = generator.generate(&event) {
                        delivered += 1;
                        yield Ok(frame);
                    }
                }
            }
            Err(e) => {
                tracing::error!("[RELAY] 流尾数据解码失败: {}", e);
                yield Ok(generators::error_frame(&e.to_string()));
                return;
            }
        }

        if let Some(frame) = generator.generate(&StreamEvent::Done { finish_reason: None }) {
            yield Ok(frame);
        }
        yield Ok(generators::done_frame());
        tracing::debug!("[RELAY] 上游流结束, 已转发 {} 个增量", delivered);
    }
}
