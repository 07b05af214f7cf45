//! 排队状态快照 — 员工面板与公共总览的聚合读取
//!
//! 两个入口都是纯读：面板/状态页靠轮询和 WebSocket 刷新信号重新
//! 拉取完整快照，从不做增量 diff。

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::SqlitePool;

use shared::models::{Store, Ticket};

use crate::core::Config;
use crate::db::repository::{RepoResult, booths, counters, tickets};
use crate::queue::engine::{self, TicketPosition};
use crate::utils::time::current_ymd;

/// 面板上等待列表的最大长度
const WAITING_LIST_CAP: i64 = 60;

/// 单个业务的当日状态行 (员工面板)
#[derive(Debug, Clone, Serialize)]
pub struct ServiceLine {
    pub service: String,
    pub waiting: i64,
    pub serving: i64,
    pub done: i64,
    pub canceled: i64,
    /// 当天发出的最后一个序号 (0 = 还没发号)
    pub last_issued: i64,
    pub now_serving: Option<String>,
    /// 现在取号要等多久 (分钟)
    pub estimated_wait_minutes: i64,
    /// FIFO 顺序的等待列表，最多 [`WAITING_LIST_CAP`] 条
    pub waiting_tickets: Vec<Ticket>,
}

/// 单个柜台的当日状态 (员工面板)
#[derive(Debug, Clone, Serialize)]
pub struct BoothPanel {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub service: String,
    pub is_active: bool,
    pub available: bool,
    /// 正在服务的工单 (可能为空)
    pub current: Option<Ticket>,
}

/// 员工面板快照：一个分店当天的完整排队状态
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub store: Store,
    pub ymd: String,
    pub services: Vec<ServiceLine>,
    pub booths: Vec<BoothPanel>,
}

/// 单个业务的公开状态行 (只含号码，不含工单明细)
#[derive(Debug, Clone, Serialize)]
pub struct PublicServiceLine {
    pub service: String,
    pub now_serving: Option<String>,
    pub waiting: i64,
    /// FIFO 顺序的等待号码，最多 [`WAITING_LIST_CAP`] 条
    pub waiting_codes: Vec<String>,
    pub estimated_wait_minutes: i64,
}

/// 可用柜台 (取号机只展示通过可用性过滤的柜台)
#[derive(Debug, Clone, Serialize)]
pub struct PublicBoothLine {
    pub id: String,
    pub name: String,
    pub service: String,
}

/// 总览里的柜台行：大屏要标出每个柜台正在叫的号
#[derive(Debug, Clone, Serialize)]
pub struct OverviewBoothLine {
    pub id: String,
    pub name: String,
    pub service: String,
    pub now_serving: Option<String>,
}

/// 公共总览：大屏/状态页使用，只暴露叫号号码本身
#[derive(Debug, Clone, Serialize)]
pub struct StoreOverview {
    pub store_id: String,
    pub store_name: String,
    pub ymd: String,
    pub services: Vec<PublicServiceLine>,
    pub booths: Vec<OverviewBoothLine>,
    /// 带 `?ticket=` 参数时附上查询者自己的位置
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<TicketPosition>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    waiting: i64,
    serving: i64,
    done: i64,
    canceled: i64,
}

/// 按业务聚合当日计数；业务集合取柜台业务与已发号业务的并集
async fn tallies_by_service(
    pool: &SqlitePool,
    store_id: &str,
    ymd: &str,
    seed_services: impl IntoIterator<Item = String>,
) -> RepoResult<BTreeMap<String, Tally>> {
    let mut map: BTreeMap<String, Tally> = BTreeMap::new();
    for service in seed_services {
        map.entry(service).or_default();
    }

    for row in tickets::service_tallies(pool, store_id, ymd).await? {
        let entry = map.entry(row.service.clone()).or_default();
        match row.status.as_str() {
            "waiting" => entry.waiting = row.count,
            "serving" => entry.serving = row.count,
            "done" => entry.done = row.count,
            "canceled" => entry.canceled = row.count,
            other => tracing::warn!(status = other, "Unknown ticket status in tally"),
        }
    }

    Ok(map)
}

/// 员工面板快照
///
/// 业务行、柜台状态和等待列表一次取齐，前端不需要再发请求。
pub async fn dashboard(
    pool: &SqlitePool,
    config: &Config,
    store: Store,
) -> RepoResult<DashboardSnapshot> {
    let ymd = current_ymd(config.timezone);

    let all_booths = booths::effective_for_store(pool, &store.id, &ymd).await?;
    let seed = all_booths.iter().map(|b| b.service.clone());
    let tallies = tallies_by_service(pool, &store.id, &ymd, seed).await?;

    let mut services = Vec::with_capacity(tallies.len());
    for (service, tally) in &tallies {
        let now_serving = tickets::now_serving_code(pool, &store.id, service, &ymd).await?;
        let last_issued = counters::current_number(pool, &store.id, service, &ymd).await?;
        let waiting_tickets =
            tickets::waiting_list(pool, &store.id, service, &ymd, WAITING_LIST_CAP).await?;

        services.push(ServiceLine {
            service: service.clone(),
            waiting: tally.waiting,
            serving: tally.serving,
            done: tally.done,
            canceled: tally.canceled,
            last_issued,
            now_serving,
            estimated_wait_minutes: (tally.waiting + tally.serving) * config.avg_service_minutes,
            waiting_tickets,
        });
    }

    let mut panels = Vec::with_capacity(all_booths.len());
    for booth in all_booths {
        let current = tickets::serving_at_booth(pool, &booth.id, &ymd).await?;
        panels.push(BoothPanel {
            id: booth.id,
            store_id: booth.store_id,
            name: booth.name,
            service: booth.service,
            is_active: booth.is_active,
            available: booth.available,
            current,
        });
    }

    Ok(DashboardSnapshot {
        store,
        ymd,
        services,
        booths: panels,
    })
}

/// 公共总览
///
/// 柜台列表经过可用性过滤 (没有状态行的柜台默认开放)；
/// 业务行包含被关闭柜台的业务 — 手里有号的人仍要看到进度。
pub async fn overview(
    pool: &SqlitePool,
    config: &Config,
    store: Store,
    ticket_public_id: Option<&str>,
) -> RepoResult<StoreOverview> {
    let ymd = current_ymd(config.timezone);

    let offered = booths::offered(pool, &store.id, &ymd).await?;
    let seed = offered.iter().map(|b| b.service.clone());
    let tallies = tallies_by_service(pool, &store.id, &ymd, seed).await?;

    let mut services = Vec::with_capacity(tallies.len());
    for (service, tally) in &tallies {
        let now_serving = tickets::now_serving_code(pool, &store.id, service, &ymd).await?;
        let waiting_codes =
            tickets::waiting_list(pool, &store.id, service, &ymd, WAITING_LIST_CAP)
                .await?
                .into_iter()
                .map(|t| t.code)
                .collect();
        services.push(PublicServiceLine {
            service: service.clone(),
            now_serving,
            waiting: tally.waiting,
            waiting_codes,
            estimated_wait_minutes: (tally.waiting + tally.serving) * config.avg_service_minutes,
        });
    }

    let mut lines = Vec::with_capacity(offered.len());
    for booth in offered {
        let now_serving = tickets::serving_at_booth(pool, &booth.id, &ymd)
            .await?
            .map(|t| t.code);
        lines.push(OverviewBoothLine {
            id: booth.id,
            name: booth.name,
            service: booth.service,
            now_serving,
        });
    }

    // 只附上属于本分店的工单位置，别家的票不在这页展示
    let ticket = match ticket_public_id {
        Some(public_id) => engine::ticket_position(pool, config, public_id)
            .await?
            .filter(|p| p.ticket.store_id == store.id),
        None => None,
    };

    Ok(StoreOverview {
        store_id: store.id,
        store_name: store.name,
        ymd,
        services,
        booths: lines,
        ticket,
    })
}
