//! Queue Server - 多门店取号排队系统
//!
//! # 架构概述
//!
//! 本模块是排队服务器的主入口，提供以下核心功能：
//!
//! - **排队引擎** (`queue`): 出票、叫号、取消、完成、状态快照
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx)
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **消息总线** (`message`): 进程内事件广播 + WebSocket 推送
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! queue-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (连接、迁移、仓储)
//! ├── message/       # 消息总线
//! ├── queue/         # 排队引擎
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod message;
pub mod queue;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use message::{BusMessage, EventType, MessageBus};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Audit logging macro - 空操作 (单店柜台场景不需要审计落盘)
#[macro_export]
macro_rules! audit_log {
    ($($arg:tt)*) => {};
}

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
///
/// 必须在 [`Config::from_env`] 之前调用，否则 `.env` 里的变量不生效。
pub fn setup_environment() -> anyhow::Result<()> {
    // .env 缺失是正常情况 (生产环境直接注入环境变量)
    let _ = dotenvy::dotenv();

    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(None, log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ____
  / __ \__  _____  __  _____
 / / / / / / / _ \/ / / / _ \
/ /_/ / /_/ /  __/ /_/ /  __/
\___\_\__,_/\___/\__,_/\___/
    "#
    );
}
