use thiserror::Error;

/// 服务器启动/运行阶段的错误
///
/// 与 [`crate::utils::AppError`] 不同，这里的错误不会变成 HTTP 响应，
/// 只用于 `main` 的退出码和启动日志。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

/// 服务器启动阶段的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
