//! Booth Operation Handlers
//!
//! 柜台动作都是 "读柜台 → 鉴权 → 引擎 → 广播" 四步。
//! 引擎的正常无操作结果 (没号可叫、没在服务) 用 200 信封 +
//! message 返回，不算错误。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::queue::{self, CallOutcome, CancelOutcome, FinishOutcome};
use crate::utils::time::current_ymd;
use crate::utils::validation::validate_ticket_code;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::message::BusMessage;
use shared::message::payload::NotificationPayload;
use shared::models::{Booth, BoothStatus, BoothStatusUpdate, Ticket, TicketFinish};

const TICKET_RESOURCE: &str = "ticket";
const BOOTH_STATUS_RESOURCE: &str = "booth_status";

/// 叫号结果
#[derive(Debug, Serialize)]
pub struct CallResult {
    pub called: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
}

/// 取消结果
#[derive(Debug, Serialize)]
pub struct CancelResult {
    pub canceled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
}

/// 完成结果
#[derive(Debug, Serialize)]
pub struct FinishResult {
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
}

/// 读柜台并检查分店权限
async fn resolve_booth(
    state: &ServerState,
    user: &CurrentUser,
    booth_id: &str,
) -> Result<Booth, AppError> {
    let booth = crate::db::repository::booths::find_by_id(&state.pool, booth_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Booth {booth_id} not found")))?;

    if !user.can_access_store(&booth.store_id) {
        return Err(AppError::forbidden(format!(
            "Not assigned to store {}",
            booth.store_id
        )));
    }

    Ok(booth)
}

/// POST /api/booths/{id}/call-next - 叫下一个号
pub async fn call_next(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(booth_id): Path<String>,
) -> AppResult<Json<AppResponse<CallResult>>> {
    let booth = resolve_booth(&state, &user, &booth_id).await?;

    match queue::call_next(&state.pool, &state.config, &booth).await? {
        CallOutcome::Called(ticket) => {
            audit_log!(
                "ticket_called",
                code = %ticket.code,
                booth_id = %booth.id,
                operator = %user.username
            );

            // 展示屏语音播报用的通知 + 状态刷新信号
            let announce = NotificationPayload::queue_call(&ticket.code, &booth.name);
            let _ = state.message_bus.publish(BusMessage::notification(&announce));
            state.broadcast_sync(
                TICKET_RESOURCE,
                "updated",
                &ticket.id.to_string(),
                Some(&ticket),
            );

            Ok(ok(CallResult {
                called: true,
                ticket: Some(ticket),
            }))
        }
        CallOutcome::AlreadyServing(current) => Ok(ok_with_message(
            CallResult {
                called: false,
                ticket: Some(current.clone()),
            },
            format!(
                "Booth is already serving {}, finish or cancel it first",
                current.code
            ),
        )),
        CallOutcome::NothingWaiting => Ok(ok_with_message(
            CallResult {
                called: false,
                ticket: None,
            },
            "No tickets waiting",
        )),
    }
}

/// POST /api/booths/{id}/cancel - 取消当前服务中的号
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(booth_id): Path<String>,
) -> AppResult<Json<AppResponse<CancelResult>>> {
    let booth = resolve_booth(&state, &user, &booth_id).await?;

    match queue::cancel_current(&state.pool, &state.config, &booth).await? {
        CancelOutcome::Canceled(ticket) => {
            audit_log!(
                "ticket_canceled",
                code = %ticket.code,
                booth_id = %booth.id,
                operator = %user.username
            );

            state.broadcast_sync(
                TICKET_RESOURCE,
                "updated",
                &ticket.id.to_string(),
                Some(&ticket),
            );

            Ok(ok(CancelResult {
                canceled: true,
                ticket: Some(ticket),
            }))
        }
        CancelOutcome::NothingServing => Ok(ok_with_message(
            CancelResult {
                canceled: false,
                ticket: None,
            },
            "Nothing serving at this booth",
        )),
    }
}

/// POST /api/booths/{id}/finish - 按号码完成
///
/// 号码在本分店当天内查找，不要求绑定本柜台。
pub async fn finish(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(booth_id): Path<String>,
    Json(payload): Json<TicketFinish>,
) -> AppResult<Json<AppResponse<FinishResult>>> {
    validate_ticket_code(&payload.code)?;
    let booth = resolve_booth(&state, &user, &booth_id).await?;

    match queue::finish_by_code(&state.pool, &state.config, &booth, &payload.code).await? {
        FinishOutcome::Finished(ticket) => {
            audit_log!(
                "ticket_finished",
                code = %ticket.code,
                booth_id = %booth.id,
                operator = %user.username
            );

            state.broadcast_sync(
                TICKET_RESOURCE,
                "updated",
                &ticket.id.to_string(),
                Some(&ticket),
            );

            Ok(ok(FinishResult {
                finished: true,
                ticket: Some(ticket),
            }))
        }
        FinishOutcome::UnknownCode => Ok(ok_with_message(
            FinishResult {
                finished: false,
                ticket: None,
            },
            format!("No ticket {} at this store today", payload.code),
        )),
        FinishOutcome::NotServing(ticket) => {
            let message = format!("Ticket {} is {}, not serving", ticket.code, ticket.status);
            Ok(ok_with_message(
                FinishResult {
                    finished: false,
                    ticket: Some(ticket),
                },
                message,
            ))
        }
    }
}

/// PUT /api/booths/{id}/status - 当日开关柜台
///
/// 只影响今天的可用性标志，明天自动恢复默认开放。
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(booth_id): Path<String>,
    Json(payload): Json<BoothStatusUpdate>,
) -> AppResult<Json<AppResponse<BoothStatus>>> {
    let booth = resolve_booth(&state, &user, &booth_id).await?;

    let ymd = current_ymd(state.config.timezone);
    let status =
        crate::db::repository::booths::upsert_status(&state.pool, &booth.id, &ymd, &payload)
            .await?;

    audit_log!(
        "booth_status_updated",
        booth_id = %booth.id,
        is_active = status.is_active,
        available = status.available,
        operator = %user.username
    );
    tracing::info!(
        booth_id = %booth.id,
        is_active = status.is_active,
        available = status.available,
        "Booth status updated"
    );

    state.broadcast_sync(BOOTH_STATUS_RESOURCE, "updated", &booth.id, Some(&status));

    Ok(ok(status))
}
