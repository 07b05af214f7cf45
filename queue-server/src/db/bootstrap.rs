//! 首次启动引导
//!
//! 服务器启动时确保基础数据就位：
//! - `admin` 账号 (密码来自 `ADMIN_PASSWORD`，生产环境必须设置)
//! - 开发环境首次启动时填充一个演示分店，方便本地联调

use sqlx::SqlitePool;

use shared::models::{BoothCreate, StoreCreate, UserCreate, UserRole};

use crate::core::Config;
use crate::db::repository;
use crate::utils::AppError;

/// 开发环境缺省密码 (生产环境拒绝启动而不是使用它们)
const DEV_ADMIN_PASSWORD: &str = "admin123";
const DEV_STAFF_PASSWORD: &str = "staff123";

/// 确保默认账号和演示数据存在
///
/// 幂等：每次启动都会调用，已存在的数据不会被改动。
pub async fn ensure_defaults(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    ensure_admin(pool, config).await?;

    if config.is_development() {
        seed_demo_store(pool).await?;
    }

    Ok(())
}

/// 确保 admin 账号存在
///
/// 密码只在首次创建时使用；之后修改 `ADMIN_PASSWORD` 不会更新已有账号。
async fn ensure_admin(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    if repository::users::find_by_username(pool, "admin")
        .await?
        .is_some()
    {
        return Ok(());
    }

    let password = match (&config.admin_password, config.is_production()) {
        (Some(p), _) => p.clone(),
        (None, false) => {
            tracing::warn!("⚠️  ADMIN_PASSWORD not set, using development default");
            DEV_ADMIN_PASSWORD.to_string()
        }
        (None, true) => {
            return Err(AppError::internal(
                "ADMIN_PASSWORD must be set in production",
            ));
        }
    };

    let user = repository::users::create(
        pool,
        UserCreate {
            username: "admin".to_string(),
            password,
            display_name: "Administrator".to_string(),
            role: UserRole::Admin,
            store_id: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Created default admin account");
    Ok(())
}

/// 开发环境演示数据：一个分店、三个柜台 (A/A/B 业务)、一个店员账号
async fn seed_demo_store(pool: &SqlitePool) -> Result<(), AppError> {
    if repository::stores::count(pool).await? > 0 {
        return Ok(());
    }

    let store = repository::stores::create(
        pool,
        StoreCreate {
            id: Some("S1".to_string()),
            name: "Demo Store".to_string(),
        },
    )
    .await?;

    for (id, name, service) in [
        ("S1-A1", "Loket 1", "A"),
        ("S1-A2", "Loket 2", "A"),
        ("S1-B1", "Loket 3", "B"),
    ] {
        repository::booths::create(
            pool,
            BoothCreate {
                id: Some(id.to_string()),
                store_id: store.id.clone(),
                name: name.to_string(),
                service: service.to_string(),
            },
        )
        .await?;
    }

    if repository::users::find_by_username(pool, "staff")
        .await?
        .is_none()
    {
        repository::users::create(
            pool,
            UserCreate {
                username: "staff".to_string(),
                password: DEV_STAFF_PASSWORD.to_string(),
                display_name: "Demo Staff".to_string(),
                role: UserRole::Staff,
                store_id: Some(store.id.clone()),
            },
        )
        .await?;
    }

    tracing::info!(store_id = %store.id, "Seeded demo store for development");
    Ok(())
}
