//! 连接注册与广播中心
//!
//! 维护所有打开的订阅者流，把每个发布的事件按发布顺序写给全部订阅者。
//!
//! # 语义
//!
//! - 事件短暂：无订阅者时直接丢弃，晚到的订阅者看不到早先的事件
//! - 单个订阅者内严格 FIFO；跨订阅者不承诺相对顺序
//! - 单个订阅者写失败只影响它自己，立即从注册表移除
//! - 心跳是普通事件，走与外部发布完全相同的广播路径

pub mod registry;

pub use registry::{Registry, Subscriber, SubscriberId, SubscriberState};

use crate::models::Event;
use crate::stream::generators;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 广播中心
#[derive(Debug)]
pub struct Hub {
    registry: Arc<Registry>,
    /// 单个订阅者的发送缓冲容量
    buffer: usize,
}

/// 一次订阅
///
/// 持有出站通道的接收端；被 Drop（客户端断开）时自动从注册表移除,
/// 移除是幂等的，广播路径先行移除也无妨。
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    receiver: mpsc::Receiver<Bytes>,
    registry: Arc<Registry>,
}

impl Subscription {
    /// 接收下一帧；注册表移除且缓冲排空后返回 `None`
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

impl Hub {
    pub fn new(buffer: usize) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            buffer,
        }
    }

    /// 注册一个订阅者
    ///
    /// 插入是 O(1) 的，与任何订阅者保持连接的时长无关。
    pub fn subscribe(&self, channel: Option<String>) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = self.registry.insert(channel, tx);
        tracing::info!("[HUB] 订阅者 {} 已注册, 当前 {} 个", id, self.registry.len());
        Subscription {
            id,
            receiver: rx,
            registry: Arc::clone(&self.registry),
        }
    }

    /// 广播一个事件，返回成功写入的订阅者数量
    ///
    /// 无订阅者时返回 0，不是错误。
    pub fn publish(&self, event: &Event) -> usize {
        let value = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(e) => {
                // 负载不透明, 序列化失败只跳过这一个事件
                tracing::warn!("[HUB] 事件序列化失败, 已跳过: {}", e);
                return 0;
            }
        };
        let frame = generators::data_frame(&value);
        let delivered = self.registry.fan_out(&frame, event.channel.as_deref());
        tracing::debug!(
            "[HUB] 事件已广播, channel={:?} delivered={}",
            event.channel,
            delivered
        );
        delivered
    }

    /// 移除一个订阅者（幂等）
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.registry.remove(id);
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// 启动心跳任务
    ///
    /// 每个间隔自发布一个合成事件，保持空闲连接穿过中间代理存活。
    /// 通过返回的句柄或取消令牌停止。
    pub fn spawn_heartbeat(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let delivered = hub.publish(&Event::heartbeat());
                        tracing::trace!("[HUB] 心跳已广播, delivered={}", delivered);
                    }
                }
            }
            tracing::info!("[HUB] 心跳任务已停止");
        })
    }
}
