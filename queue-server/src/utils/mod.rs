//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResponse`] - API 响应结构
//! - 时间、校验、日志等工具

pub mod error;
pub mod logger;
pub mod result;
pub mod time;
pub mod validation;

// Re-export error types
pub use error::{AppError, AppResponse};
pub use error::{ok, ok_empty, ok_with_message};
pub use result::AppResult;
