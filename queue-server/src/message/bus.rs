//! 消息总线核心实现
//!
//! # 消息流
//!
//! ```text
//! Handler ──▶ publish() ──▶ server_tx ──▶ Subscribed WebSocket sessions
//!                                     └─▶ (display boards, status pages)
//! ```
//!
//! 总线只做进程内广播：每个 WebSocket 会话持有一个 [`broadcast::Receiver`]，
//! 慢速消费者跟不上时丢弃最旧的消息 (Lagged) 而不是阻塞写入方。

use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::utils::AppError;

/// 广播通道默认容量
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// 消息总线 - 负责事件广播
///
/// # 职责
///
/// - 事件广播 (publish)
/// - 订阅管理 (subscribe, subscriber_count)
/// - 优雅关闭 (shutdown_token, shutdown)
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// 服务器到订阅者的广播通道
    server_tx: broadcast::Sender<BusMessage>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl MessageBus {
    /// 创建默认容量的消息总线
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// 创建指定容量的消息总线
    pub fn with_capacity(capacity: usize) -> Self {
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            server_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布消息 (服务器 -> 所有订阅者)
    ///
    /// 没有任何订阅者时发送会失败，这不是错误：
    /// 展示屏可以随时断开，此时事件直接丢弃。
    pub fn publish(&self, msg: BusMessage) -> Result<usize, AppError> {
        match self.server_tx.send(msg) {
            Ok(n) => Ok(n),
            Err(broadcast::error::SendError(_)) => Ok(0),
        }
    }

    /// 订阅服务器广播
    ///
    /// WebSocket 会话使用此方法接收排队事件
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// 获取广播发送端 (高级用法)
    pub fn sender(&self) -> &broadcast::Sender<BusMessage> {
        &self.server_tx
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.server_tx.receiver_count()
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 优雅关闭消息总线
    ///
    /// 通知所有 WebSocket 会话退出
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::payload::NotificationPayload;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = MessageBus::with_capacity(8);
        let mut rx = bus.subscribe();

        let payload = NotificationPayload::queue_call("A005", "Loket 2");
        let msg = BusMessage::notification(&payload);
        let delivered = bus.publish(msg).unwrap();
        assert_eq!(delivered, 1);

        let received = rx.recv().await.unwrap();
        let parsed: NotificationPayload = received.parse_payload().unwrap();
        assert_eq!(parsed.title, payload.title);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let bus = MessageBus::new();
        let payload = NotificationPayload::queue_call("B001", "Loket 1");
        let delivered = bus.publish(BusMessage::notification(&payload)).unwrap();
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_token() {
        let bus = MessageBus::new();
        let token = bus.shutdown_token().clone();
        assert!(!token.is_cancelled());

        bus.shutdown();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_subscriber_count() {
        let bus = MessageBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let _rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }
}
