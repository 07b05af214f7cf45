//! 排队引擎 — 取号、叫号、取消、完成
//!
//! 所有操作都以 (store, service, ymd) 为分区：号码在分区内连续递增，
//! 跨分区互不影响。日切换不需要重置计数器，新的 ymd 自然从 1 开始。
//!
//! 取号的序号分配是唯一需要互斥的地方，由 counters 表的原子
//! upsert 保证 (见 [`crate::db::repository::counters::next_number`])。
//! 其余状态迁移都是单行的条件更新，天然幂等。

use serde::Serialize;
use sqlx::SqlitePool;

use shared::models::{Booth, Ticket};
use shared::util::short_token;

use crate::core::Config;
use crate::db::repository::{RepoError, RepoResult, counters, stores, tickets};
use crate::utils::time::current_ymd;

/// 取号结果 — 打印小票所需的全部信息
#[derive(Debug, Clone, Serialize)]
pub struct IssueReceipt {
    pub ticket: Ticket,
    /// 排在前面、仍在等待的号数
    pub waiting_before: i64,
    /// 当前正在叫的号 (可能为空)
    pub now_serving: Option<String>,
    /// 估算等待时间 (分钟)
    pub estimated_wait_minutes: i64,
    /// 顾客状态页链接 (打印成二维码)
    pub status_url: String,
}

/// 叫号结果
#[derive(Debug, Clone)]
pub enum CallOutcome {
    /// 叫到了下一个号
    Called(Ticket),
    /// 该柜台还有号在服务中，需要先 finish / cancel
    AlreadyServing(Ticket),
    /// 队列为空 — 正常运营状态，不是错误
    NothingWaiting,
}

/// 取消结果
#[derive(Debug, Clone)]
pub enum CancelOutcome {
    Canceled(Ticket),
    /// 该柜台当前没有在服务的号
    NothingServing,
}

/// 完成结果
#[derive(Debug, Clone)]
pub enum FinishOutcome {
    Finished(Ticket),
    /// 今天该分店没有这个号码
    UnknownCode,
    /// 号码存在但不在服务中 (还在等待或已结束)
    NotServing(Ticket),
}

/// 状态页查询结果
#[derive(Debug, Clone, Serialize)]
pub struct TicketPosition {
    pub ticket: Ticket,
    pub waiting_before: i64,
    pub now_serving: Option<String>,
    pub estimated_wait_minutes: i64,
}

/// 组合人类可读的号码：业务字母 + 三位补零序号
///
/// 超过 999 后自然变宽 (`A1000`)，不截断。
pub fn format_code(service: &str, number: i64) -> String {
    format!("{service}{number:03}")
}

/// 等待时间估算：(前面等待数 + 服务中数) × 单号平均分钟
fn estimate_minutes(config: &Config, waiting_before: i64, serving: i64) -> i64 {
    (waiting_before + serving) * config.avg_service_minutes
}

/// 取号
///
/// 原子分配当天下一个序号，落一行 `waiting` 工单，并返回小票数据。
/// 序号分配与工单插入不在同一事务里：分配成功但插入失败会留下一个
/// 空洞号码，顾客侧表现为跳号，不影响正确性。
pub async fn issue_ticket(
    pool: &SqlitePool,
    config: &Config,
    store_id: &str,
    service: &str,
) -> RepoResult<IssueReceipt> {
    if stores::find_by_id(pool, store_id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Store {store_id} not found")));
    }

    let ymd = current_ymd(config.timezone);
    let number = counters::next_number(pool, store_id, service, &ymd).await?;
    let code = format_code(service, number);
    let public_id = short_token();

    let ticket = tickets::insert(
        pool,
        tickets::NewTicket {
            public_id: &public_id,
            store_id,
            service,
            ymd: &ymd,
            number,
            code: &code,
        },
    )
    .await?;

    let waiting_before = tickets::waiting_before(pool, store_id, service, &ymd, number).await?;
    let serving = tickets::serving_count(pool, store_id, service, &ymd).await?;
    let now_serving = tickets::now_serving_code(pool, store_id, service, &ymd).await?;
    let status_url = format!(
        "{}/api/public/tickets/{}",
        config.public_base_url, ticket.public_id
    );

    tracing::info!(
        store_id,
        service,
        code = %ticket.code,
        waiting_before,
        "Ticket issued"
    );

    Ok(IssueReceipt {
        ticket,
        waiting_before,
        now_serving,
        estimated_wait_minutes: estimate_minutes(config, waiting_before, serving),
        status_url,
    })
}

/// 叫号：取出该柜台业务最早的等待号
///
/// 强制单号服务：柜台已有 `serving` 工单时拒绝叫下一个，
/// 必须先 finish / cancel。两个柜台抢同一个号时输家自动
/// 拿下一个候选 (条件更新失败后重试)。
pub async fn call_next(
    pool: &SqlitePool,
    config: &Config,
    booth: &Booth,
) -> RepoResult<CallOutcome> {
    let ymd = current_ymd(config.timezone);

    if let Some(current) = tickets::serving_at_booth(pool, &booth.id, &ymd).await? {
        return Ok(CallOutcome::AlreadyServing(current));
    }

    loop {
        let Some(candidate) =
            tickets::oldest_waiting(pool, &booth.store_id, &booth.service, &ymd).await?
        else {
            return Ok(CallOutcome::NothingWaiting);
        };

        if tickets::mark_serving(pool, candidate.id, &booth.id).await? {
            let ticket = tickets::find_by_id(pool, candidate.id).await?.ok_or_else(|| {
                RepoError::NotFound(format!("Ticket {} vanished after call", candidate.id))
            })?;

            tracing::info!(
                booth_id = %booth.id,
                code = %ticket.code,
                "Ticket called"
            );
            return Ok(CallOutcome::Called(ticket));
        }
        // 输给了同业务的另一个柜台，换下一个候选
    }
}

/// 取消该柜台当前服务中的号 (顾客未到等场景)
///
/// 终态，不能恢复。柜台没有服务中的号时是正常无操作。
pub async fn cancel_current(
    pool: &SqlitePool,
    config: &Config,
    booth: &Booth,
) -> RepoResult<CancelOutcome> {
    let ymd = current_ymd(config.timezone);

    let Some(current) = tickets::serving_at_booth(pool, &booth.id, &ymd).await? else {
        return Ok(CancelOutcome::NothingServing);
    };

    if tickets::mark_canceled(pool, current.id).await? {
        let ticket = tickets::find_by_id(pool, current.id).await?.ok_or_else(|| {
            RepoError::NotFound(format!("Ticket {} vanished after cancel", current.id))
        })?;

        tracing::info!(booth_id = %booth.id, code = %ticket.code, "Ticket canceled");
        Ok(CancelOutcome::Canceled(ticket))
    } else {
        // 并发 finish 抢先了一步
        Ok(CancelOutcome::NothingServing)
    }
}

/// 按号码完成工单
///
/// 按 (分店, 号码, 今天) 定位，不校验工单绑定的柜台 —
/// 柜台绑定只是参考信息，店员可以在任意柜台收尾同店的号。
pub async fn finish_by_code(
    pool: &SqlitePool,
    config: &Config,
    booth: &Booth,
    code: &str,
) -> RepoResult<FinishOutcome> {
    let ymd = current_ymd(config.timezone);

    let Some(ticket) = tickets::find_by_code(pool, &booth.store_id, code, &ymd).await? else {
        return Ok(FinishOutcome::UnknownCode);
    };

    if tickets::mark_done(pool, ticket.id).await? {
        let ticket = tickets::find_by_id(pool, ticket.id).await?.ok_or_else(|| {
            RepoError::NotFound(format!("Ticket {} vanished after finish", ticket.id))
        })?;

        tracing::info!(booth_id = %booth.id, code = %ticket.code, "Ticket finished");
        Ok(FinishOutcome::Finished(ticket))
    } else {
        Ok(FinishOutcome::NotServing(ticket))
    }
}

/// 按公共标识查询工单位置
///
/// 纯读操作，状态页秒级轮询调用。
pub async fn ticket_position(
    pool: &SqlitePool,
    config: &Config,
    public_id: &str,
) -> RepoResult<Option<TicketPosition>> {
    let Some(ticket) = tickets::find_by_public_id(pool, public_id).await? else {
        return Ok(None);
    };

    position_for(pool, config, ticket).await.map(Some)
}

/// 计算一张工单的队列位置
///
/// 始终使用工单自己的 ymd 分区：昨天的工单永远看不到今天的队列。
pub async fn position_for(
    pool: &SqlitePool,
    config: &Config,
    ticket: Ticket,
) -> RepoResult<TicketPosition> {
    let waiting_before = tickets::waiting_before(
        pool,
        &ticket.store_id,
        &ticket.service,
        &ticket.ymd,
        ticket.number,
    )
    .await?;
    let serving =
        tickets::serving_count(pool, &ticket.store_id, &ticket.service, &ticket.ymd).await?;
    let now_serving =
        tickets::now_serving_code(pool, &ticket.store_id, &ticket.service, &ticket.ymd).await?;

    Ok(TicketPosition {
        waiting_before,
        now_serving,
        estimated_wait_minutes: estimate_minutes(config, waiting_before, serving),
        ticket,
    })
}
