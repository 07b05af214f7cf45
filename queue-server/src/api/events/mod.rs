//! Realtime Events API 模块
//!
//! `GET /api/events` 升级为 WebSocket，把排队事件推送给展示屏
//! 和状态页。事件是 "有变化，重新拉取" 的刷新信号，客户端始终
//! 通过 REST 重新读取完整状态，从不把事件流当作事实来源。

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use shared::message::payload::{NotificationPayload, SyncPayload};
use shared::message::{BusMessage, EventType};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(handle_events_ws))
}

/// 推送给订阅者的事件帧
///
/// `sync` 是资源刷新信号 (带递增版本号)，`notification`
/// 是展示屏直接播报的内容 (叫号语音)。
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum EventFrame {
    Sync(SyncPayload),
    Notification(NotificationPayload),
}

/// GET /api/events — upgrade to WebSocket
pub async fn handle_events_ws(
    State(state): State<ServerState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

async fn handle_ws_connection(socket: WebSocket, state: ServerState) {
    let mut rx = state.message_bus.subscribe();
    let shutdown = state.message_bus.shutdown_token().clone();

    tracing::info!(
        subscribers = state.message_bus.subscriber_count(),
        "Event stream connected"
    );

    let (mut ws_sink, mut ws_stream) = socket.split();

    loop {
        tokio::select! {
            // 收帧: 展示屏是只读客户端，只应答 ping
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Event stream disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!("Event stream error: {e}");
                        break;
                    }
                    _ => {} // Text, Binary, Pong — ignore
                }
            }

            // Queue event to push
            msg = rx.recv() => {
                match msg {
                    Ok(bus_msg) => {
                        let Some(frame) = to_frame(&bus_msg) else { continue };
                        if let Ok(json) = serde_json::to_string(&frame)
                            && ws_sink.send(Message::Text(json.into())).await.is_err()
                        {
                            tracing::warn!("Failed to push event, disconnecting");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // 慢速展示屏跳过积压事件；客户端下次轮询会补全状态
                        tracing::warn!(skipped, "Event subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            // Server shutdown
            _ = shutdown.cancelled() => {
                tracing::info!("Event stream closing on shutdown");
                break;
            }
        }
    }

    // Send Close frame (best-effort)
    let _ = ws_sink.close().await;
}

/// 把总线消息翻译成外发帧；无法解析的载荷直接丢弃
fn to_frame(msg: &BusMessage) -> Option<EventFrame> {
    match msg.event_type {
        EventType::Sync => msg.parse_payload::<SyncPayload>().ok().map(EventFrame::Sync),
        EventType::Notification => msg
            .parse_payload::<NotificationPayload>()
            .ok()
            .map(EventFrame::Notification),
    }
}
