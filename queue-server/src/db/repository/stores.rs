//! Store Repository

use super::{RepoError, RepoResult};
use shared::models::{Store, StoreCreate};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Store>> {
    let store =
        sqlx::query_as::<_, Store>("SELECT id, name, created_at FROM stores WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(store)
}

pub async fn create(pool: &SqlitePool, data: StoreCreate) -> RepoResult<Store> {
    let id = data.id.unwrap_or_else(shared::util::short_token);
    let now = shared::util::now_millis();
    sqlx::query("INSERT INTO stores (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(&data.name)
        .bind(now)
        .execute(pool)
        .await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create store".into()))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stores")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
