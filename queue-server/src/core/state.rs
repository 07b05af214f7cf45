use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use shared::message::{BusMessage, SyncPayload};
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::{DbService, bootstrap};
use crate::message::MessageBus;

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增。
///
/// # 使用场景
///
/// 用于 broadcast_sync 时自动生成递增的版本号，
/// 确保展示屏可以通过版本号判断数据新旧。
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    /// 创建空的版本管理器
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    ///
    /// 如果资源不存在，返回 0
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是排队服务器的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc / 连接池实现浅拷贝，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | message_bus | MessageBus | 事件广播总线 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | resource_versions | Arc<ResourceVersions> | 资源版本管理 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 事件广播总线
    pub message_bus: MessageBus,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 资源版本管理器 (用于 broadcast_sync 自动递增版本号)
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`initialize()`](Self::initialize) 方法代替
    pub fn new(
        config: Config,
        pool: SqlitePool,
        message_bus: MessageBus,
        jwt_service: Arc<JwtService>,
        resource_versions: Arc<ResourceVersions>,
    ) -> Self {
        Self {
            config,
            pool,
            message_bus,
            jwt_service,
            resource_versions,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保 database/、logs/ 存在)
    /// 2. 数据库 (work_dir/database/queue.db) + 迁移
    /// 3. 默认账号与演示数据 (admin 账号、开发环境的演示分店)
    /// 4. 各服务 (MessageBus, JWT)
    ///
    /// # Panics
    ///
    /// 工作目录、数据库或默认账号初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("queue.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");
        let pool = db_service.pool;

        // 2. Seed default accounts (and demo data in development)
        bootstrap::ensure_defaults(&pool, config)
            .await
            .expect("Failed to ensure default accounts");

        // 3. Initialize services
        let message_bus = MessageBus::new();
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let resource_versions = Arc::new(ResourceVersions::new());

        Self::new(
            config.clone(),
            pool,
            message_bus,
            jwt_service,
            resource_versions,
        )
    }

    /// 获取数据库连接池
    pub fn get_db(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 获取消息总线
    pub fn message_bus(&self) -> &MessageBus {
        &self.message_bus
    }

    /// 广播同步消息
    ///
    /// 向所有订阅的展示屏广播资源变更通知。
    /// 版本号由 ResourceVersions 自动递增管理。
    ///
    /// # 参数
    /// - `resource`: 资源类型 (如 "ticket", "booth_status")
    /// - `action`: 变更类型 ("created", "updated", "deleted")
    /// - `id`: 资源 ID
    /// - `data`: 资源数据 (deleted 时为 None)
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        let _ = self.message_bus.publish(BusMessage::sync(&payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_versions_increment() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.get("ticket"), 0);
        assert_eq!(versions.increment("ticket"), 1);
        assert_eq!(versions.increment("ticket"), 2);
        assert_eq!(versions.increment("booth_status"), 1);
        assert_eq!(versions.get("ticket"), 2);
    }
}
