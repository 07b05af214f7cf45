//! Booth Operations API 模块
//!
//! 每个柜台的叫号 / 取消 / 完成动作，以及当日开关状态。

mod handler;

use axum::{Router, routing::post, routing::put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/booths", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/call-next", post(handler::call_next))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/finish", post(handler::finish))
        .route("/{id}/status", put(handler::update_status))
}
