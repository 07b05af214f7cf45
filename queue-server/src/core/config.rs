use std::path::{Path, PathBuf};

use chrono_tz::Tz;

use crate::auth::JwtConfig;

/// 服务器配置 - 排队服务器的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/queue | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Asia/Jakarta | 排队日切换使用的时区 |
/// | AVG_SERVICE_MINUTES | 5 | 估算等待时间的单号平均分钟数 |
/// | PUBLIC_BASE_URL | http://localhost:3000 | 小票上状态页链接的前缀 |
/// | ADMIN_PASSWORD | (无) | 首次启动时 admin 账号的密码 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/queue HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 排队日 (ymd) 划分使用的时区
    ///
    /// 所有号码、柜台开关和统计都按这个时区的自然日分桶。
    pub timezone: Tz,
    /// 每个号码的平均服务时长 (分钟)，用于估算等待时间
    pub avg_service_minutes: i64,
    /// 状态页链接前缀 (打印在小票上)
    pub public_base_url: String,
    /// 首次启动时创建 admin 账号使用的密码
    ///
    /// 生产环境必须设置；开发环境缺省为 `admin123`。
    pub admin_password: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|name| match name.parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(_) => {
                    tracing::warn!("Invalid TIMEZONE {:?}, falling back to Asia/Jakarta", name);
                    None
                }
            })
            .unwrap_or(chrono_tz::Asia::Jakarta);

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/queue".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone,
            avg_service_minutes: std::env::var("AVG_SERVICE_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件目录
    pub fn database_dir(&self) -> PathBuf {
        Path::new(&self.work_dir).join("database")
    }

    /// 日志文件目录
    pub fn logs_dir(&self) -> PathBuf {
        Path::new(&self.work_dir).join("logs")
    }

    /// 创建工作目录结构 (database/, logs/)
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
