//! Store Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::stores;
use crate::queue::{self, DashboardSnapshot};
use crate::utils::{AppError, AppResult};

/// GET /api/stores/{id}/dashboard - 员工面板快照
///
/// 一次返回业务行、柜台状态和等待列表；面板靠轮询 +
/// WebSocket 刷新信号重新拉取。
pub async fn dashboard(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(store_id): Path<String>,
) -> AppResult<Json<DashboardSnapshot>> {
    let store = stores::find_by_id(&state.pool, &store_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Store {store_id} not found")))?;

    if !user.can_access_store(&store.id) {
        return Err(AppError::forbidden(format!(
            "Not assigned to store {}",
            store.id
        )));
    }

    let snapshot = queue::dashboard(&state.pool, &state.config, store).await?;
    Ok(Json(snapshot))
}
