//! Public Status Handlers
//!
//! 匿名接口只认公共标识和分店 ID，从不暴露内部工单 ID。
//! 状态页秒级轮询这里，所以每个接口都保持单纯的读路径。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{booths, stores};
use crate::queue::{self, StoreOverview, TicketPosition};
use crate::queue::snapshot::PublicBoothLine;
use crate::utils::time::current_ymd;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_empty};

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    /// 查询者手里的公共工单标识，用于在总览里附上自己的位置
    pub ticket: Option<String>,
}

/// GET /api/public/tickets/{public_id} - 工单状态查询
///
/// 未知标识是正常结局 (顾客扫了过期小票)，返回 200 空数据
/// 而不是 404，状态页轮询不会因此报错。
pub async fn ticket_status(
    State(state): State<ServerState>,
    Path(public_id): Path<String>,
) -> AppResult<Json<AppResponse<TicketPosition>>> {
    match queue::ticket_position(&state.pool, &state.config, &public_id).await? {
        Some(position) => Ok(ok(position)),
        None => Ok(ok_empty("Ticket not found")),
    }
}

/// GET /api/public/stores/{id}/booths - 取号机柜台列表
///
/// 只返回今天 `available` 且 `is_active` 的柜台；
/// 没有状态行的柜台默认开放。
pub async fn store_booths(
    State(state): State<ServerState>,
    Path(store_id): Path<String>,
) -> AppResult<Json<Vec<PublicBoothLine>>> {
    if stores::find_by_id(&state.pool, &store_id).await?.is_none() {
        return Err(AppError::not_found(format!("Store {store_id} not found")));
    }

    let ymd = current_ymd(state.config.timezone);
    let offered = booths::offered(&state.pool, &store_id, &ymd).await?;

    let lines = offered
        .into_iter()
        .map(|b| PublicBoothLine {
            id: b.id,
            name: b.name,
            service: b.service,
        })
        .collect();

    Ok(Json(lines))
}

/// GET /api/public/stores/{id}/overview - 分店大屏总览
pub async fn store_overview(
    State(state): State<ServerState>,
    Path(store_id): Path<String>,
    Query(query): Query<OverviewQuery>,
) -> AppResult<Json<StoreOverview>> {
    let store = stores::find_by_id(&state.pool, &store_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Store {store_id} not found")))?;

    let overview =
        queue::overview(&state.pool, &state.config, store, query.ticket.as_deref()).await?;

    Ok(Json(overview))
}
