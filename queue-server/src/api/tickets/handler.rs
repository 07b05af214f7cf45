//! Ticket Issuance Handlers

use axum::{Json, extract::State};

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::queue;
use crate::utils::validation::validate_service_letter;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::TicketCreate;

const RESOURCE: &str = "ticket";

/// POST /api/tickets - 取号
///
/// 取号机以绑定分店的员工身份调用。返回的 [`queue::IssueReceipt`]
/// 含小票需要的全部字段 (号码、前方人数、当前叫号、预计等待、状态页链接)。
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<TicketCreate>,
) -> AppResult<Json<AppResponse<queue::IssueReceipt>>> {
    validate_service_letter(&payload.service)?;

    if !user.can_access_store(&payload.store_id) {
        return Err(AppError::forbidden(format!(
            "Not assigned to store {}",
            payload.store_id
        )));
    }

    let receipt =
        queue::issue_ticket(&state.pool, &state.config, &payload.store_id, &payload.service)
            .await?;

    audit_log!(
        "ticket_issued",
        code = %receipt.ticket.code,
        store_id = %payload.store_id,
        operator = %user.username
    );

    state.broadcast_sync(
        RESOURCE,
        "created",
        &receipt.ticket.id.to_string(),
        Some(&receipt.ticket),
    );

    Ok(ok(receipt))
}
