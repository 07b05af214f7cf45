//! Counter Repository
//!
//! One row per (store, service, day). [`next_number`] is the linearization
//! point of ticket issuance: the increment-or-insert upsert bumps and
//! returns in a single statement, so concurrent issuers always observe
//! distinct, gap-free numbers. Day rollover needs no reset job — a new ymd
//! simply inserts a fresh row starting at 1.

use super::RepoResult;
use sqlx::SqlitePool;

/// Allocate the next ticket number for a (store, service, day).
pub async fn next_number(
    pool: &SqlitePool,
    store_id: &str,
    service: &str,
    ymd: &str,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let number = sqlx::query_scalar::<_, i64>(
        "INSERT INTO counters (store_id, service, ymd, last_number, updated_at) \
         VALUES (?, ?, ?, 1, ?) \
         ON CONFLICT (store_id, service, ymd) \
         DO UPDATE SET last_number = last_number + 1, updated_at = excluded.updated_at \
         RETURNING last_number",
    )
    .bind(store_id)
    .bind(service)
    .bind(ymd)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(number)
}

/// Last issued number for a (store, service, day); 0 when nothing issued yet.
pub async fn current_number(
    pool: &SqlitePool,
    store_id: &str,
    service: &str,
    ymd: &str,
) -> RepoResult<i64> {
    let number = sqlx::query_scalar::<_, i64>(
        "SELECT last_number FROM counters WHERE store_id = ? AND service = ? AND ymd = ?",
    )
    .bind(store_id)
    .bind(service)
    .bind(ymd)
    .fetch_optional(pool)
    .await?;
    Ok(number.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Create an in-memory SQLite pool with the counters table.
    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE counters (
                store_id TEXT NOT NULL,
                service TEXT NOT NULL,
                ymd TEXT NOT NULL,
                last_number INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (store_id, service, ymd)
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[tokio::test]
    async fn test_next_number_is_sequential() {
        let pool = test_pool().await;
        for expected in 1..=3 {
            let n = next_number(&pool, "S1", "A", "2025-06-01").await.unwrap();
            assert_eq!(n, expected);
        }
        let last = current_number(&pool, "S1", "A", "2025-06-01").await.unwrap();
        assert_eq!(last, 3);
    }

    #[tokio::test]
    async fn test_sequences_are_independent_per_key() {
        let pool = test_pool().await;
        next_number(&pool, "S1", "A", "2025-06-01").await.unwrap();
        next_number(&pool, "S1", "A", "2025-06-01").await.unwrap();

        // 另一个业务、另一天都从 1 重新开始
        assert_eq!(next_number(&pool, "S1", "B", "2025-06-01").await.unwrap(), 1);
        assert_eq!(next_number(&pool, "S1", "A", "2025-06-02").await.unwrap(), 1);
        assert_eq!(next_number(&pool, "S2", "A", "2025-06-01").await.unwrap(), 1);

        // 原序列不受影响
        assert_eq!(next_number(&pool, "S1", "A", "2025-06-01").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_current_number_defaults_to_zero() {
        let pool = test_pool().await;
        let n = current_number(&pool, "S1", "A", "2025-06-01").await.unwrap();
        assert_eq!(n, 0);
    }
}
