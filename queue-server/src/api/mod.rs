//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查接口
//! - [`auth`] - 认证相关接口
//! - [`tickets`] - 出票接口
//! - [`booths`] - 柜台操作接口（叫号、取消、完成、开关）
//! - [`stores`] - 门店仪表盘接口
//! - [`public`] - 公共状态页接口（无需登录）
//! - [`events`] - WebSocket 事件推送

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

pub mod auth;
pub mod booths;
pub mod events;
pub mod health;
pub mod public;
pub mod stores;
pub mod tickets;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum application with all routes and middleware
pub fn build_app(state: ServerState) -> Router {
    Router::<ServerState>::new()
        // Core APIs
        .merge(auth::router())
        .merge(health::router())
        // Queue APIs
        .merge(tickets::router())
        .merge(booths::router())
        .merge(stores::router())
        // Public status pages + event stream
        .merge(public::router())
        .merge(events::router())
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Tower HTTP 中间件
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}
