//! Ticket Repository
//!
//! Status transitions are guarded UPDATEs (`... WHERE status = 'x'`); a
//! transition that matched no row reports `false` and the caller decides
//! whether that is a race, a replay, or a user error. Terminal states are
//! never overwritten.

use super::{RepoError, RepoResult};
use shared::models::Ticket;
use sqlx::SqlitePool;

/// Insert payload for a freshly issued ticket
#[derive(Debug)]
pub struct NewTicket<'a> {
    pub public_id: &'a str,
    pub store_id: &'a str,
    pub service: &'a str,
    pub ymd: &'a str,
    pub number: i64,
    pub code: &'a str,
}

pub async fn insert(pool: &SqlitePool, data: NewTicket<'_>) -> RepoResult<Ticket> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO tickets (id, public_id, store_id, service, ymd, number, code, status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 'waiting', ?)",
    )
    .bind(id)
    .bind(data.public_id)
    .bind(data.store_id)
    .bind(data.service)
    .bind(data.ymd)
    .bind(data.number)
    .bind(data.code)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create ticket".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(
        "SELECT id, public_id, store_id, service, ymd, number, code, status, booth_id, created_at, called_at, finished_at FROM tickets WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(ticket)
}

pub async fn find_by_public_id(pool: &SqlitePool, public_id: &str) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(
        "SELECT id, public_id, store_id, service, ymd, number, code, status, booth_id, created_at, called_at, finished_at FROM tickets WHERE public_id = ?",
    )
    .bind(public_id)
    .fetch_optional(pool)
    .await?;
    Ok(ticket)
}

/// Look up by display code within one (store, day). Codes repeat across
/// days, so the day is part of the key.
pub async fn find_by_code(
    pool: &SqlitePool,
    store_id: &str,
    code: &str,
    ymd: &str,
) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(
        "SELECT id, public_id, store_id, service, ymd, number, code, status, booth_id, created_at, called_at, finished_at FROM tickets WHERE store_id = ? AND code = ? AND ymd = ?",
    )
    .bind(store_id)
    .bind(code)
    .bind(ymd)
    .fetch_optional(pool)
    .await?;
    Ok(ticket)
}

/// Head of the FIFO queue for a (store, service, day).
pub async fn oldest_waiting(
    pool: &SqlitePool,
    store_id: &str,
    service: &str,
    ymd: &str,
) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(
        "SELECT id, public_id, store_id, service, ymd, number, code, status, booth_id, created_at, called_at, finished_at FROM tickets \
         WHERE store_id = ? AND service = ? AND ymd = ? AND status = 'waiting' \
         ORDER BY number ASC LIMIT 1",
    )
    .bind(store_id)
    .bind(service)
    .bind(ymd)
    .fetch_optional(pool)
    .await?;
    Ok(ticket)
}

/// Ticket currently being served at a booth today, if any.
pub async fn serving_at_booth(
    pool: &SqlitePool,
    booth_id: &str,
    ymd: &str,
) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(
        "SELECT id, public_id, store_id, service, ymd, number, code, status, booth_id, created_at, called_at, finished_at FROM tickets \
         WHERE booth_id = ? AND ymd = ? AND status = 'serving' \
         ORDER BY called_at DESC LIMIT 1",
    )
    .bind(booth_id)
    .bind(ymd)
    .fetch_optional(pool)
    .await?;
    Ok(ticket)
}

/// waiting -> serving. Returns false when the ticket was not waiting
/// anymore (raced with another call or already terminal).
pub async fn mark_serving(pool: &SqlitePool, id: i64, booth_id: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "UPDATE tickets SET status = 'serving', booth_id = ?, called_at = ? \
         WHERE id = ? AND status = 'waiting'",
    )
    .bind(booth_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// serving -> canceled (no-show). Terminal states stay untouched.
pub async fn mark_canceled(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "UPDATE tickets SET status = 'canceled', finished_at = ? \
         WHERE id = ? AND status = 'serving'",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// serving -> done. Terminal states stay untouched.
pub async fn mark_done(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "UPDATE tickets SET status = 'done', finished_at = ? \
         WHERE id = ? AND status = 'serving'",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// How many waiting tickets sit ahead of `number` in its queue.
pub async fn waiting_before(
    pool: &SqlitePool,
    store_id: &str,
    service: &str,
    ymd: &str,
    number: i64,
) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM tickets \
         WHERE store_id = ? AND service = ? AND ymd = ? AND status = 'waiting' AND number < ?",
    )
    .bind(store_id)
    .bind(service)
    .bind(ymd)
    .bind(number)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn serving_count(
    pool: &SqlitePool,
    store_id: &str,
    service: &str,
    ymd: &str,
) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM tickets \
         WHERE store_id = ? AND service = ? AND ymd = ? AND status = 'serving'",
    )
    .bind(store_id)
    .bind(service)
    .bind(ymd)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Code of the most recently called, still-serving ticket in a queue.
pub async fn now_serving_code(
    pool: &SqlitePool,
    store_id: &str,
    service: &str,
    ymd: &str,
) -> RepoResult<Option<String>> {
    let code = sqlx::query_scalar::<_, String>(
        "SELECT code FROM tickets \
         WHERE store_id = ? AND service = ? AND ymd = ? AND status = 'serving' \
         ORDER BY called_at DESC LIMIT 1",
    )
    .bind(store_id)
    .bind(service)
    .bind(ymd)
    .fetch_optional(pool)
    .await?;
    Ok(code)
}

/// Waiting tickets in FIFO order, capped for display surfaces.
pub async fn waiting_list(
    pool: &SqlitePool,
    store_id: &str,
    service: &str,
    ymd: &str,
    limit: i64,
) -> RepoResult<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(
        "SELECT id, public_id, store_id, service, ymd, number, code, status, booth_id, created_at, called_at, finished_at FROM tickets \
         WHERE store_id = ? AND service = ? AND ymd = ? AND status = 'waiting' \
         ORDER BY number ASC LIMIT ?",
    )
    .bind(store_id)
    .bind(service)
    .bind(ymd)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

/// Per-service, per-status ticket counts for one (store, day).
#[derive(Debug, sqlx::FromRow)]
pub struct ServiceTally {
    pub service: String,
    pub status: String,
    pub count: i64,
}

pub async fn service_tallies(
    pool: &SqlitePool,
    store_id: &str,
    ymd: &str,
) -> RepoResult<Vec<ServiceTally>> {
    let tallies = sqlx::query_as::<_, ServiceTally>(
        "SELECT service, status, COUNT(*) as count FROM tickets \
         WHERE store_id = ? AND ymd = ? \
         GROUP BY service, status \
         ORDER BY service",
    )
    .bind(store_id)
    .bind(ymd)
    .fetch_all(pool)
    .await?;
    Ok(tallies)
}
