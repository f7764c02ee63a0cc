//! 订阅者注册表
//!
//! 进程内唯一的共享可变结构。只有两种变更：订阅时插入、关闭时移除，
//! 两者都是幂等的。广播在持锁期间完成快照式遍历，避免遍历中变更；
//! 锁内只做非阻塞的 `try_send`，持锁时间与订阅者数量成正比且极短。

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// 订阅者标识，进程生命周期内唯一
pub type SubscriberId = u64;

/// 订阅者状态
///
/// Open 于注册时建立；写失败或传输层断开进入 Closing；
/// 从注册表移除完成后为 Closed（终态）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    Open,
    Closing,
    Closed,
}

/// 一个打开的出站流
#[derive(Debug)]
pub struct Subscriber {
    pub id: SubscriberId,
    /// 逻辑频道过滤；`None` 接收所有事件
    pub channel: Option<String>,
    /// 出站句柄：有界通道，满或关闭即视为不可写
    outbound: mpsc::Sender<Bytes>,
    pub state: SubscriberState,
}

impl Subscriber {
    /// 该订阅者是否接收指定频道的事件
    ///
    /// 无频道的订阅者接收一切；无频道的事件（含心跳）对所有人可见。
    fn accepts(&self, event_channel: Option<&str>) -> bool {
        match (self.channel.as_deref(), event_channel) {
            (None, _) | (_, None) => true,
            (Some(mine), Some(theirs)) => mine == theirs,
        }
    }
}

/// 订阅者注册表
#[derive(Debug, Default)]
pub struct Registry {
    inner: Mutex<HashMap<SubscriberId, Subscriber>>,
    next_id: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个订阅者，返回分配的 ID
    ///
    /// 插入时出站句柄必然可写（通道刚创建）。
    pub fn insert(&self, channel: Option<String>, outbound: mpsc::Sender<Bytes>) -> SubscriberId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subscriber = Subscriber {
            id,
            channel,
            outbound,
            state: SubscriberState::Open,
        };
        self.inner.lock().insert(id, subscriber);
        id
    }

    /// 移除一个订阅者（幂等）
    ///
    /// 返回是否真的移除了条目。
    pub fn remove(&self, id: SubscriberId) -> bool {
        let removed = self.inner.lock().remove(&id);
        match removed {
            Some(mut subscriber) => {
                subscriber.state = SubscriberState::Closed;
                tracing::debug!("[HUB] 订阅者 {} 已移除", id);
                true
            }
            None => false,
        }
    }

    /// 当前订阅者数量
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// 将一帧写入所有匹配的订阅者
    ///
    /// 单个订阅者写失败不会中断其他投递：该订阅者被标记 Closing
    /// 并在本次遍历结束时移除。返回成功写入的数量（0 也是成功）。
    pub fn fan_out(&self, frame: &Bytes, event_channel: Option<&str>) -> usize {
        let mut inner = self.inner.lock();
        let mut delivered = 0;
        let mut dead: Vec<SubscriberId> = Vec::new();

        for subscriber in inner.values_mut() {
            if !subscriber.accepts(event_channel) {
                continue;
            }
            match subscriber.outbound.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("[HUB] 订阅者 {} 写入超时(缓冲已满), 按断开处理", subscriber.id);
                    subscriber.state = SubscriberState::Closing;
                    dead.push(subscriber.id);
                }
                Err(TrySendError::Closed(_)) => {
                    subscriber.state = SubscriberState::Closing;
                    dead.push(subscriber.id);
                }
            }
        }

        for id in dead {
            if let Some(mut subscriber) = inner.remove(&id) {
                subscriber.state = SubscriberState::Closed;
                tracing::debug!("[HUB] 订阅者 {} 不可写, 已移除", id);
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_idempotent() {
        let registry = Registry::new();
        let (tx, _rx) = mpsc::channel(4);
        let id = registry.insert(None, tx);
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unique_ids() {
        let registry = Registry::new();
        let (tx, _rx) = mpsc::channel(4);
        let a = registry.insert(None, tx.clone());
        let b = registry.insert(None, tx);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fan_out_channel_filter() {
        let registry = Registry::new();
        let (tx_all, mut rx_all) = mpsc::channel(4);
        let (tx_ingest, mut rx_ingest) = mpsc::channel(4);
        registry.insert(None, tx_all);
        registry.insert(Some("ingest".to_string()), tx_ingest);

        let frame = Bytes::from_static(b"data: {}\n\n");

        // 指定频道的事件：无频道订阅者 + 同频道订阅者
        assert_eq!(registry.fan_out(&frame, Some("ingest")), 2);
        // 其他频道的事件：只有无频道订阅者
        assert_eq!(registry.fan_out(&frame, Some("other")), 1);
        // 无频道事件（心跳）：所有人
        assert_eq!(registry.fan_out(&frame, None), 2);

        assert!(rx_all.try_recv().is_ok());
        assert!(rx_ingest.try_recv().is_ok());
    }

    #[test]
    fn test_fan_out_removes_full_subscriber() {
        let registry = Registry::new();
        let (tx_slow, _rx_slow) = mpsc::channel(1);
        let (tx_ok, mut rx_ok) = mpsc::channel(4);
        registry.insert(None, tx_slow);
        registry.insert(None, tx_ok);

        let frame = Bytes::from_static(b"data: 1\n\n");
        assert_eq!(registry.fan_out(&frame, None), 2);
        // 慢速订阅者缓冲已满, 本次只有健康订阅者收到, 且慢速者被移除
        assert_eq!(registry.fan_out(&frame, None), 1);
        assert_eq!(registry.len(), 1);

        assert!(rx_ok.try_recv().is_ok());
        assert!(rx_ok.try_recv().is_ok());
    }

    #[test]
    fn test_fan_out_removes_closed_subscriber() {
        let registry = Registry::new();
        let (tx, rx) = mpsc::channel(4);
        registry.insert(None, tx);
        drop(rx);

        let frame = Bytes::from_static(b"data: 1\n\n");
        assert_eq!(registry.fan_out(&frame, None), 0);
        assert!(registry.is_empty());
    }
}
