use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Notification Level ====================

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// 普通信息
    Info,
    /// 警告
    Warning,
    /// 错误
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// 通知分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// 系统级通知
    System,
    /// 排队业务（叫号、取消等）
    Queue,
}

// ==================== Payloads ====================

/// 通知载荷 (服务端 -> 客户端)
///
/// 用于大厅显示屏的叫号播报和系统提示。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// 标题
    pub title: String,
    /// 消息内容
    pub message: String,
    /// 通知级别
    pub level: NotificationLevel,
    /// 通知分类
    pub category: NotificationCategory,
    /// 附加数据 (JSON)
    pub data: Option<serde_json::Value>,
}

/// 同步信号载荷 (服务端 -> 所有客户端)
///
/// 当某个资源发生变更时（出票、叫号、取消、完成、柜台开关），
/// 服务端广播此信号，通知所有感兴趣的客户端刷新数据。
///
/// # 示例
/// - `resource`: "ticket"
/// - `version`: 42
/// - `action`: "called"
/// - `id`: "1234567890"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// 资源类型 (例如: "ticket", "booth_status")
    pub resource: String,
    /// 版本号 (前端据此判断是否漏收事件、需要全量刷新)
    pub version: u64,
    /// 变更类型 (例如: "created", "called", "canceled", "finished")
    pub action: String,
    /// 资源 ID
    pub id: String,
    /// 资源数据 (可选)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// ==================== Convenience Constructors ====================

impl NotificationPayload {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Info,
            category: NotificationCategory::System,
            data: None,
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Warning,
            category: NotificationCategory::System,
            data: None,
        }
    }

    /// 叫号播报（显示屏用）
    pub fn queue_call(code: impl Into<String>, booth_name: impl Into<String>) -> Self {
        let code = code.into();
        let booth_name = booth_name.into();
        Self {
            title: "call".to_string(),
            message: format!("{code} -> {booth_name}"),
            level: NotificationLevel::Info,
            category: NotificationCategory::Queue,
            data: Some(serde_json::json!({ "code": code, "booth_name": booth_name })),
        }
    }
}
