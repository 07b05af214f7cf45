//! Public Status API 模块
//!
//! 顾客状态页、取号机柜台列表和分店大屏总览。
//! 全部匿名可访问，全部纯读。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/public", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/tickets/{public_id}", get(handler::ticket_status))
        .route("/stores/{id}/booths", get(handler::store_booths))
        .route("/stores/{id}/overview", get(handler::store_overview))
}
