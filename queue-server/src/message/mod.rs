//! 消息模块
//!
//! 进程内事件广播：排队状态变化 (叫号、取消、完成、开关柜台)
//! 通过 [`MessageBus`] 推送给所有订阅的 WebSocket 会话。
//!
//! 消息格式定义在 `shared::message` (与前端展示屏共用)。

pub mod bus;

pub use bus::MessageBus;
pub use shared::message::{BusMessage, EventType};
