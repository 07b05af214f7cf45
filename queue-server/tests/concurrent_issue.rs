//! 并发压力测试
//!
//! 多台取号机同时取号、两个柜台同时叫号：序号必须不重、不漏，
//! 每个号最多被一个柜台服务一次。串行化点只有 counters 的原子
//! upsert 和工单的条件更新，测试验证这两处在真实并发下成立。

use std::collections::HashSet;

use queue_server::db::repository::{booths, stores, tickets};
use queue_server::queue::{self, CallOutcome};
use queue_server::utils::time::current_ymd;
use queue_server::{Config, ServerState};
use shared::models::{Booth, BoothCreate, StoreCreate};
use tempfile::TempDir;

const ISSUERS: usize = 8;
const TICKETS_PER_ISSUER: usize = 25;

async fn test_state() -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    config.environment = "test".to_string();
    config.admin_password = Some("admin123".to_string());
    config.avg_service_minutes = 5;

    let state = ServerState::initialize(&config).await;
    (state, dir)
}

async fn seed_store(state: &ServerState) -> (Booth, Booth) {
    stores::create(
        &state.pool,
        StoreCreate {
            id: Some("T1".to_string()),
            name: "Test Store".to_string(),
        },
    )
    .await
    .expect("create store");

    let mut created = Vec::new();
    for (id, name) in [("T1-A1", "Counter 1"), ("T1-A2", "Counter 2")] {
        created.push(
            booths::create(
                &state.pool,
                BoothCreate {
                    id: Some(id.to_string()),
                    store_id: "T1".to_string(),
                    name: name.to_string(),
                    service: "A".to_string(),
                },
            )
            .await
            .expect("create booth"),
        );
    }
    let a2 = created.pop().unwrap();
    let a1 = created.pop().unwrap();
    (a1, a2)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_is_dense_and_unique() {
    let (state, _dir) = test_state().await;
    seed_store(&state).await;

    let mut handles = Vec::with_capacity(ISSUERS);
    for _ in 0..ISSUERS {
        let pool = state.pool.clone();
        let config = state.config.clone();
        handles.push(tokio::spawn(async move {
            let mut codes = Vec::with_capacity(TICKETS_PER_ISSUER);
            for _ in 0..TICKETS_PER_ISSUER {
                let receipt = queue::issue_ticket(&pool, &config, "T1", "A")
                    .await
                    .expect("issue ticket");
                codes.push(receipt.ticket.code);
            }
            codes
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.expect("issuer task panicked"));
    }

    let total = ISSUERS * TICKETS_PER_ISSUER;
    assert_eq!(all.len(), total);

    // 无重复
    let unique: HashSet<String> = all.iter().cloned().collect();
    assert_eq!(unique.len(), total, "duplicate codes issued");

    // 无空洞：1..=total 全部出现
    for n in 1..=total {
        let code = format!("A{n:03}");
        assert!(unique.contains(&code), "missing code {code}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_never_double_serve() {
    const QUEUE_LEN: usize = 30;

    let (state, _dir) = test_state().await;
    let (a1, a2) = seed_store(&state).await;

    for _ in 0..QUEUE_LEN {
        queue::issue_ticket(&state.pool, &state.config, "T1", "A")
            .await
            .expect("issue ticket");
    }

    // 两个柜台同时清空同一条队列：叫到就立即完成
    let worker = |booth: Booth| {
        let pool = state.pool.clone();
        let config = state.config.clone();
        tokio::spawn(async move {
            let mut served = Vec::new();
            loop {
                match queue::call_next(&pool, &config, &booth)
                    .await
                    .expect("call next")
                {
                    CallOutcome::Called(t) => {
                        queue::finish_by_code(&pool, &config, &booth, &t.code)
                            .await
                            .expect("finish");
                        served.push(t.code);
                    }
                    CallOutcome::AlreadyServing(t) => {
                        // 上一轮残留，收尾后继续
                        queue::finish_by_code(&pool, &config, &booth, &t.code)
                            .await
                            .expect("finish leftover");
                    }
                    CallOutcome::NothingWaiting => break,
                }
            }
            served
        })
    };

    let handle_a = worker(a1);
    let handle_b = worker(a2);

    let served_a = handle_a.await.expect("worker a panicked");
    let served_b = handle_b.await.expect("worker b panicked");

    // 每个号恰好被服务一次
    let mut seen: HashSet<String> = HashSet::new();
    for code in served_a.iter().chain(served_b.iter()) {
        assert!(seen.insert(code.clone()), "code {code} served twice");
    }
    assert_eq!(seen.len(), QUEUE_LEN);

    // 队列清空，全部落在 done
    let ymd = current_ymd(state.config.timezone);
    let mut done = 0;
    for tally in tickets::service_tallies(&state.pool, "T1", &ymd)
        .await
        .expect("tallies")
    {
        match tally.status.as_str() {
            "done" => done = tally.count,
            other => panic!("unexpected leftover status {other} x{}", tally.count),
        }
    }
    assert_eq!(done, QUEUE_LEN as i64);
}
