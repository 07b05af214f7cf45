//! 排队全流程集成测试
//!
//! 使用 ServerState::initialize 完整初始化 (临时工作目录 + 真实 SQLite)，
//! 直接驱动排队引擎验证取号、叫号、取消、完成的状态机，以及
//! 面板/公共总览快照的聚合口径。

use queue_server::db::repository::{booths, counters, stores, tickets};
use queue_server::queue::{self, CallOutcome, CancelOutcome, FinishOutcome};
use queue_server::utils::time::current_ymd;
use queue_server::{Config, ServerState};
use shared::models::{Booth, BoothCreate, BoothStatusUpdate, Store, StoreCreate, TicketStatus};
use tempfile::TempDir;

/// 独立的测试环境：临时目录 + 全新数据库
///
/// 环境固定为 "test"，跳过演示数据填充，所有数据由测试自己创建。
async fn test_state() -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    config.environment = "test".to_string();
    config.admin_password = Some("admin123".to_string());
    config.avg_service_minutes = 5;

    let state = ServerState::initialize(&config).await;
    (state, dir)
}

/// 一个分店、三个柜台：A 业务两个，B 业务一个
async fn seed_store(state: &ServerState) -> (Store, Booth, Booth, Booth) {
    let store = stores::create(
        &state.pool,
        StoreCreate {
            id: Some("T1".to_string()),
            name: "Test Store".to_string(),
        },
    )
    .await
    .expect("create store");

    let mut created = Vec::new();
    for (id, name, service) in [
        ("T1-A1", "Counter 1", "A"),
        ("T1-A2", "Counter 2", "A"),
        ("T1-B1", "Counter 3", "B"),
    ] {
        let booth = booths::create(
            &state.pool,
            BoothCreate {
                id: Some(id.to_string()),
                store_id: store.id.clone(),
                name: name.to_string(),
                service: service.to_string(),
            },
        )
        .await
        .expect("create booth");
        created.push(booth);
    }

    let b1 = created.pop().unwrap();
    let a2 = created.pop().unwrap();
    let a1 = created.pop().unwrap();
    (store, a1, a2, b1)
}

#[tokio::test]
async fn test_codes_are_per_service_and_dense() {
    let (state, _dir) = test_state().await;
    let (store, ..) = seed_store(&state).await;

    let first = queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();
    let other = queue::issue_ticket(&state.pool, &state.config, &store.id, "B")
        .await
        .unwrap();
    let second = queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();

    // 每个业务独立计数，互不影响
    assert_eq!(first.ticket.code, "A001");
    assert_eq!(other.ticket.code, "B001");
    assert_eq!(second.ticket.code, "A002");
    assert_eq!(second.ticket.number, 2);
    assert_eq!(second.ticket.status, TicketStatus::Waiting);
}

#[tokio::test]
async fn test_issue_receipt_reports_queue_position() {
    let (state, _dir) = test_state().await;
    let (store, a1, ..) = seed_store(&state).await;

    let first = queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();
    assert_eq!(first.waiting_before, 0);
    assert_eq!(first.estimated_wait_minutes, 0);
    assert_eq!(first.now_serving, None);
    assert!(
        first
            .status_url
            .ends_with(&format!("/api/public/tickets/{}", first.ticket.public_id))
    );

    // A001 还在等待，第二张票前面排 1 个
    let second = queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();
    assert_eq!(second.waiting_before, 1);
    // (1 等待 + 0 服务中) × 5 分钟
    assert_eq!(second.estimated_wait_minutes, 5);

    // 叫走 A001 之后重新查询：前面没人等了，但 A001 占着柜台
    match queue::call_next(&state.pool, &state.config, &a1).await.unwrap() {
        CallOutcome::Called(t) => assert_eq!(t.code, "A001"),
        other => panic!("expected Called, got {other:?}"),
    }

    let position = queue::ticket_position(&state.pool, &state.config, &second.ticket.public_id)
        .await
        .unwrap()
        .expect("second ticket should be found");
    assert_eq!(position.waiting_before, 0);
    assert_eq!(position.now_serving.as_deref(), Some("A001"));
    // (0 等待 + 1 服务中) × 5 分钟
    assert_eq!(position.estimated_wait_minutes, 5);

    // 大屏口径：A1 柜台标着正在叫 A001，等待号码只剩 A002
    let overview = queue::overview(&state.pool, &state.config, store, None)
        .await
        .unwrap();
    let booth_line = overview
        .booths
        .iter()
        .find(|b| b.id == a1.id)
        .expect("booth a1 in overview");
    assert_eq!(booth_line.now_serving.as_deref(), Some("A001"));
    let line_a = overview
        .services
        .iter()
        .find(|s| s.service == "A")
        .expect("service A in overview");
    assert_eq!(line_a.waiting_codes, vec!["A002"]);
}

#[tokio::test]
async fn test_issue_rejects_unknown_store() {
    let (state, _dir) = test_state().await;
    seed_store(&state).await;

    let result = queue::issue_ticket(&state.pool, &state.config, "NOPE", "A").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_call_next_is_fifo() {
    let (state, _dir) = test_state().await;
    let (store, a1, ..) = seed_store(&state).await;

    for _ in 0..3 {
        queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
            .await
            .unwrap();
    }

    let called = match queue::call_next(&state.pool, &state.config, &a1).await.unwrap() {
        CallOutcome::Called(t) => t,
        other => panic!("expected Called, got {other:?}"),
    };
    assert_eq!(called.code, "A001");
    assert_eq!(called.status, TicketStatus::Serving);
    assert_eq!(called.booth_id.as_deref(), Some("T1-A1"));
    assert!(called.called_at.is_some());

    // 完成后再叫，拿到的是下一个最早的号
    match queue::finish_by_code(&state.pool, &state.config, &a1, "A001")
        .await
        .unwrap()
    {
        FinishOutcome::Finished(t) => assert_eq!(t.status, TicketStatus::Done),
        other => panic!("expected Finished, got {other:?}"),
    }
    match queue::call_next(&state.pool, &state.config, &a1).await.unwrap() {
        CallOutcome::Called(t) => assert_eq!(t.code, "A002"),
        other => panic!("expected Called, got {other:?}"),
    }
}

#[tokio::test]
async fn test_call_next_refuses_second_ticket_at_same_booth() {
    let (state, _dir) = test_state().await;
    let (store, a1, ..) = seed_store(&state).await;

    queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();
    queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();

    match queue::call_next(&state.pool, &state.config, &a1).await.unwrap() {
        CallOutcome::Called(t) => assert_eq!(t.code, "A001"),
        other => panic!("expected Called, got {other:?}"),
    }

    // 手上还有号，拒绝再叫；队列不受影响
    match queue::call_next(&state.pool, &state.config, &a1).await.unwrap() {
        CallOutcome::AlreadyServing(t) => assert_eq!(t.code, "A001"),
        other => panic!("expected AlreadyServing, got {other:?}"),
    }

    let ymd = current_ymd(state.config.timezone);
    let head = tickets::oldest_waiting(&state.pool, &store.id, "A", &ymd)
        .await
        .unwrap()
        .expect("A002 should still be waiting");
    assert_eq!(head.code, "A002");
}

#[tokio::test]
async fn test_call_next_on_empty_queue_is_noop() {
    let (state, _dir) = test_state().await;
    let (_, a1, ..) = seed_store(&state).await;

    match queue::call_next(&state.pool, &state.config, &a1).await.unwrap() {
        CallOutcome::NothingWaiting => {}
        other => panic!("expected NothingWaiting, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancel_is_terminal() {
    let (state, _dir) = test_state().await;
    let (store, a1, ..) = seed_store(&state).await;

    let issued = queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();
    queue::call_next(&state.pool, &state.config, &a1).await.unwrap();

    match queue::cancel_current(&state.pool, &state.config, &a1)
        .await
        .unwrap()
    {
        CancelOutcome::Canceled(t) => {
            assert_eq!(t.status, TicketStatus::Canceled);
            assert!(t.finished_at.is_some());
        }
        other => panic!("expected Canceled, got {other:?}"),
    }

    // 再取消一次：柜台已经空了，正常无操作
    match queue::cancel_current(&state.pool, &state.config, &a1)
        .await
        .unwrap()
    {
        CancelOutcome::NothingServing => {}
        other => panic!("expected NothingServing, got {other:?}"),
    }

    // 终态不可覆盖：对已取消的号 finish 只会报告它不在服务中
    match queue::finish_by_code(&state.pool, &state.config, &a1, "A001")
        .await
        .unwrap()
    {
        FinishOutcome::NotServing(t) => assert_eq!(t.status, TicketStatus::Canceled),
        other => panic!("expected NotServing, got {other:?}"),
    }

    let fresh = tickets::find_by_id(&state.pool, issued.ticket.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fresh.status, TicketStatus::Canceled);
    assert!(fresh.status.is_terminal());
}

#[tokio::test]
async fn test_finish_binds_by_store_not_booth() {
    let (state, _dir) = test_state().await;
    let (store, a1, _, b1) = seed_store(&state).await;

    queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();
    queue::call_next(&state.pool, &state.config, &a1).await.unwrap();

    // 同店任意柜台都可以收尾 (B 柜台完成 A 业务的号)
    match queue::finish_by_code(&state.pool, &state.config, &b1, "A001")
        .await
        .unwrap()
    {
        FinishOutcome::Finished(t) => {
            assert_eq!(t.status, TicketStatus::Done);
            assert!(t.finished_at.is_some());
        }
        other => panic!("expected Finished, got {other:?}"),
    }
}

#[tokio::test]
async fn test_finish_unknown_and_waiting_codes() {
    let (state, _dir) = test_state().await;
    let (store, a1, ..) = seed_store(&state).await;
    let ymd = current_ymd(state.config.timezone);

    // 别家店也有一张 A001，不能被本店收尾
    let t2 = stores::create(
        &state.pool,
        StoreCreate {
            id: Some("T2".to_string()),
            name: "Other Store".to_string(),
        },
    )
    .await
    .unwrap();
    queue::issue_ticket(&state.pool, &state.config, &t2.id, "A")
        .await
        .unwrap();

    // 今天不存在的号码
    match queue::finish_by_code(&state.pool, &state.config, &a1, "A999")
        .await
        .unwrap()
    {
        FinishOutcome::UnknownCode => {}
        other => panic!("expected UnknownCode, got {other:?}"),
    }

    // 号码查找按店隔离：T2 的 A001 在本店等同于不存在
    match queue::finish_by_code(&state.pool, &state.config, &a1, "A001")
        .await
        .unwrap()
    {
        FinishOutcome::UnknownCode => {}
        other => panic!("expected UnknownCode, got {other:?}"),
    }
    let foreign = tickets::find_by_code(&state.pool, &t2.id, "A001", &ymd)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(foreign.status, TicketStatus::Waiting);

    // 还在等待的号不能直接完成
    queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();
    match queue::finish_by_code(&state.pool, &state.config, &a1, "A001")
        .await
        .unwrap()
    {
        FinishOutcome::NotServing(t) => assert_eq!(t.status, TicketStatus::Waiting),
        other => panic!("expected NotServing, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ticket_position_by_public_id() {
    let (state, _dir) = test_state().await;
    let (store, ..) = seed_store(&state).await;

    let mut receipts = Vec::new();
    for _ in 0..3 {
        receipts.push(
            queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
                .await
                .unwrap(),
        );
    }

    let third = &receipts[2].ticket;
    let position = queue::ticket_position(&state.pool, &state.config, &third.public_id)
        .await
        .unwrap()
        .expect("ticket should be found");
    assert_eq!(position.waiting_before, 2);
    assert_eq!(position.ticket.code, "A003");
    // (2 等待 + 0 服务中) × 5 分钟
    assert_eq!(position.estimated_wait_minutes, 10);

    // 未知 public_id 返回 None，调用方决定如何呈现
    let missing = queue::ticket_position(&state.pool, &state.config, "000000000000")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_position_uses_tickets_own_day() {
    let (state, _dir) = test_state().await;
    let (store, ..) = seed_store(&state).await;

    // 直接落两张昨天的票 (引擎只会写当天，旧票用仓储层模拟)
    for (public_id, number, code) in [("old0000001a", 1, "A001"), ("old0000002b", 2, "A002")] {
        tickets::insert(
            &state.pool,
            tickets::NewTicket {
                public_id,
                store_id: &store.id,
                service: "A",
                ymd: "2020-01-01",
                number,
                code,
            },
        )
        .await
        .unwrap();
    }

    // 今天另发一张，不应影响旧票的位置
    queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();

    let position = queue::ticket_position(&state.pool, &state.config, "old0000002b")
        .await
        .unwrap()
        .expect("old ticket still queryable");
    assert_eq!(position.ticket.ymd, "2020-01-01");
    // 旧票前面只有同一天的 A001
    assert_eq!(position.waiting_before, 1);
}

#[tokio::test]
async fn test_counter_partitions_are_independent() {
    let (state, _dir) = test_state().await;
    let (store, ..) = seed_store(&state).await;

    assert_eq!(
        counters::next_number(&state.pool, &store.id, "A", "2025-06-01")
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        counters::next_number(&state.pool, &store.id, "A", "2025-06-01")
            .await
            .unwrap(),
        2
    );
    // 其他业务、其他日期都从 1 重新开始
    assert_eq!(
        counters::next_number(&state.pool, &store.id, "B", "2025-06-01")
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        counters::next_number(&state.pool, &store.id, "A", "2025-06-02")
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        counters::current_number(&state.pool, &store.id, "A", "2025-06-01")
            .await
            .unwrap(),
        2
    );
    // 没发过号的分区读到 0
    assert_eq!(
        counters::current_number(&state.pool, &store.id, "C", "2025-06-01")
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_terminal_states_never_overwritten() {
    let (state, _dir) = test_state().await;
    let (store, a1, ..) = seed_store(&state).await;

    let issued = queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();
    let id = issued.ticket.id;

    assert!(tickets::mark_serving(&state.pool, id, &a1.id).await.unwrap());
    assert!(tickets::mark_done(&state.pool, id).await.unwrap());

    // done 之后一切迁移都失败
    assert!(!tickets::mark_serving(&state.pool, id, &a1.id).await.unwrap());
    assert!(!tickets::mark_canceled(&state.pool, id).await.unwrap());
    assert!(!tickets::mark_done(&state.pool, id).await.unwrap());

    let fresh = tickets::find_by_id(&state.pool, id).await.unwrap().unwrap();
    assert_eq!(fresh.status, TicketStatus::Done);
    assert!(fresh.status.is_terminal());
}

#[tokio::test]
async fn test_two_booths_share_one_queue() {
    let (state, _dir) = test_state().await;
    let (store, a1, a2, _) = seed_store(&state).await;

    for _ in 0..4 {
        queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
            .await
            .unwrap();
    }

    // 两个柜台轮流从同一条队列取号
    match queue::call_next(&state.pool, &state.config, &a1).await.unwrap() {
        CallOutcome::Called(t) => assert_eq!(t.code, "A001"),
        other => panic!("expected Called, got {other:?}"),
    }
    match queue::call_next(&state.pool, &state.config, &a2).await.unwrap() {
        CallOutcome::Called(t) => assert_eq!(t.code, "A002"),
        other => panic!("expected Called, got {other:?}"),
    }

    queue::finish_by_code(&state.pool, &state.config, &a1, "A001")
        .await
        .unwrap();
    match queue::call_next(&state.pool, &state.config, &a1).await.unwrap() {
        CallOutcome::Called(t) => assert_eq!(t.code, "A003"),
        other => panic!("expected Called, got {other:?}"),
    }

    // A004 前面已无等待，两个号在服务中
    let ymd = current_ymd(state.config.timezone);
    let last = tickets::find_by_code(&state.pool, &store.id, "A004", &ymd)
        .await
        .unwrap()
        .unwrap();
    let position = queue::ticket_position(&state.pool, &state.config, &last.public_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(position.waiting_before, 0);
    assert_eq!(position.now_serving.as_deref(), Some("A003"));
    assert_eq!(position.estimated_wait_minutes, 10);
}

#[tokio::test]
async fn test_dashboard_counts_by_service() {
    let (state, _dir) = test_state().await;
    let (store, a1, ..) = seed_store(&state).await;

    for _ in 0..3 {
        queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
            .await
            .unwrap();
    }
    queue::issue_ticket(&state.pool, &state.config, &store.id, "B")
        .await
        .unwrap();

    // A001 被叫后放弃，A002 接着被叫
    queue::call_next(&state.pool, &state.config, &a1).await.unwrap();
    queue::cancel_current(&state.pool, &state.config, &a1)
        .await
        .unwrap();
    queue::call_next(&state.pool, &state.config, &a1).await.unwrap();

    let snapshot = queue::dashboard(&state.pool, &state.config, store.clone())
        .await
        .unwrap();

    let line_a = snapshot
        .services
        .iter()
        .find(|s| s.service == "A")
        .expect("service A present");
    assert_eq!(line_a.waiting, 1);
    assert_eq!(line_a.serving, 1);
    assert_eq!(line_a.done, 0);
    assert_eq!(line_a.canceled, 1);
    assert_eq!(line_a.last_issued, 3);
    assert_eq!(line_a.now_serving.as_deref(), Some("A002"));
    assert_eq!(line_a.waiting_tickets.len(), 1);
    assert_eq!(line_a.waiting_tickets[0].code, "A003");

    let line_b = snapshot
        .services
        .iter()
        .find(|s| s.service == "B")
        .expect("service B present");
    assert_eq!(line_b.waiting, 1);
    assert_eq!(line_b.last_issued, 1);

    let panel_a1 = snapshot
        .booths
        .iter()
        .find(|b| b.id == a1.id)
        .expect("booth present");
    assert!(panel_a1.is_active);
    assert!(panel_a1.available);
    assert_eq!(
        panel_a1.current.as_ref().map(|t| t.code.as_str()),
        Some("A002")
    );
}

#[tokio::test]
async fn test_booth_availability_gate() {
    let (state, _dir) = test_state().await;
    let (store, a1, a2, b1) = seed_store(&state).await;
    let ymd = current_ymd(state.config.timezone);

    queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();

    // 没有状态行时默认开放
    let open = booths::offered(&state.pool, &store.id, &ymd).await.unwrap();
    assert_eq!(open.len(), 3);

    // 暂停 a1：总览里不再出现，面板上仍可见但标记为不可用
    booths::upsert_status(
        &state.pool,
        &a1.id,
        &ymd,
        &BoothStatusUpdate {
            is_active: None,
            available: Some(false),
        },
    )
    .await
    .unwrap();

    let overview = queue::overview(&state.pool, &state.config, store.clone(), None)
        .await
        .unwrap();
    let ids: Vec<&str> = overview.booths.iter().map(|b| b.id.as_str()).collect();
    assert!(!ids.contains(&a1.id.as_str()));
    assert!(ids.contains(&a2.id.as_str()));
    assert!(ids.contains(&b1.id.as_str()));

    // 柜台被暂停不影响业务进度行
    let line_a = overview
        .services
        .iter()
        .find(|s| s.service == "A")
        .expect("service A in overview");
    assert_eq!(line_a.waiting, 1);
    assert_eq!(line_a.waiting_codes, vec!["A001"]);

    let snapshot = queue::dashboard(&state.pool, &state.config, store.clone())
        .await
        .unwrap();
    let panel = snapshot.booths.iter().find(|b| b.id == a1.id).unwrap();
    assert!(!panel.available);

    // 下线 a2 之后 A 业务没有开放柜台，但 A 的进度行还在 — 手里有票的人要看进度
    booths::upsert_status(
        &state.pool,
        &a2.id,
        &ymd,
        &BoothStatusUpdate {
            is_active: Some(false),
            available: None,
        },
    )
    .await
    .unwrap();

    let overview = queue::overview(&state.pool, &state.config, store.clone(), None)
        .await
        .unwrap();
    assert_eq!(overview.booths.len(), 1);
    assert_eq!(overview.booths[0].id, b1.id);
    assert!(overview.services.iter().any(|s| s.service == "A"));

    // 省略的字段保持原值：a1 的 available 仍是 false
    let status = booths::status_for_day(&state.pool, &a1.id, &ymd)
        .await
        .unwrap()
        .unwrap();
    assert!(status.is_active);
    assert!(!status.available);
}

#[tokio::test]
async fn test_overview_ticket_param_scoped_to_store() {
    let (state, _dir) = test_state().await;
    let (store, ..) = seed_store(&state).await;

    let other = stores::create(
        &state.pool,
        StoreCreate {
            id: Some("T2".to_string()),
            name: "Other Store".to_string(),
        },
    )
    .await
    .unwrap();

    let mine = queue::issue_ticket(&state.pool, &state.config, &store.id, "A")
        .await
        .unwrap();

    // 自己店的票会附上位置
    let overview = queue::overview(
        &state.pool,
        &state.config,
        store.clone(),
        Some(mine.ticket.public_id.as_str()),
    )
    .await
    .unwrap();
    assert!(overview.ticket.is_some());

    // 别家店的总览不展示这张票
    let foreign = queue::overview(
        &state.pool,
        &state.config,
        other,
        Some(mine.ticket.public_id.as_str()),
    )
    .await
    .unwrap();
    assert!(foreign.ticket.is_none());
}
