//! Booth Repository
//!
//! Effective availability is computed with a LEFT JOIN against
//! `booth_status`: a missing row for today means open and available
//! (default-open), so provisioning a booth needs no status bookkeeping.

use super::{RepoError, RepoResult};
use shared::models::{Booth, BoothCreate, BoothStatus, BoothStatusUpdate, BoothWithStatus};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Booth>> {
    let booth = sqlx::query_as::<_, Booth>(
        "SELECT id, store_id, name, service, created_at FROM booths WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(booth)
}

pub async fn create(pool: &SqlitePool, data: BoothCreate) -> RepoResult<Booth> {
    let id = data.id.unwrap_or_else(shared::util::short_token);
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO booths (id, store_id, name, service, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&data.store_id)
    .bind(&data.name)
    .bind(&data.service)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create booth".into()))
}

/// Today's explicit status row, if staff toggled anything.
pub async fn status_for_day(
    pool: &SqlitePool,
    booth_id: &str,
    ymd: &str,
) -> RepoResult<Option<BoothStatus>> {
    let status = sqlx::query_as::<_, BoothStatus>(
        "SELECT booth_id, ymd, is_active, available, updated_at FROM booth_status \
         WHERE booth_id = ? AND ymd = ?",
    )
    .bind(booth_id)
    .bind(ymd)
    .fetch_optional(pool)
    .await?;
    Ok(status)
}

/// Upsert today's flags. Omitted flags keep their current value; flags not
/// yet toggled today materialize with their default (true).
pub async fn upsert_status(
    pool: &SqlitePool,
    booth_id: &str,
    ymd: &str,
    update: &BoothStatusUpdate,
) -> RepoResult<BoothStatus> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO booth_status (booth_id, ymd, is_active, available, updated_at) \
         VALUES (?1, ?2, COALESCE(?3, 1), COALESCE(?4, 1), ?5) \
         ON CONFLICT (booth_id, ymd) DO UPDATE SET \
           is_active = COALESCE(?3, booth_status.is_active), \
           available = COALESCE(?4, booth_status.available), \
           updated_at = ?5",
    )
    .bind(booth_id)
    .bind(ymd)
    .bind(update.is_active)
    .bind(update.available)
    .bind(now)
    .execute(pool)
    .await?;

    status_for_day(pool, booth_id, ymd)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to upsert booth status".into()))
}

/// All booths of a store with their effective flags for one day.
pub async fn effective_for_store(
    pool: &SqlitePool,
    store_id: &str,
    ymd: &str,
) -> RepoResult<Vec<BoothWithStatus>> {
    let booths = sqlx::query_as::<_, BoothWithStatus>(
        "SELECT b.id, b.store_id, b.name, b.service, b.created_at, \
                COALESCE(s.is_active, 1) AS is_active, \
                COALESCE(s.available, 1) AS available \
         FROM booths b \
         LEFT JOIN booth_status s ON s.booth_id = b.id AND s.ymd = ?1 \
         WHERE b.store_id = ?2 \
         ORDER BY b.name",
    )
    .bind(ymd)
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(booths)
}

/// Booths currently offered to visitors: active and available today.
pub async fn offered(pool: &SqlitePool, store_id: &str, ymd: &str) -> RepoResult<Vec<Booth>> {
    let booths = sqlx::query_as::<_, Booth>(
        "SELECT b.id, b.store_id, b.name, b.service, b.created_at \
         FROM booths b \
         LEFT JOIN booth_status s ON s.booth_id = b.id AND s.ymd = ?1 \
         WHERE b.store_id = ?2 \
           AND COALESCE(s.is_active, 1) = 1 \
           AND COALESCE(s.available, 1) = 1 \
         ORDER BY b.name",
    )
    .bind(ymd)
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(booths)
}
