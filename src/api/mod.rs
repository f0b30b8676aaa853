use crate::state::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;

pub mod common;
mod handlers;

pub const ASSET_ROUTE: &str = "/binary.html";
pub const AUTH_ROUTE: &str = "/auth";

/// 构建路由：静态资源与授权交换之外的所有路径都进入中继
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(ASSET_ROUTE, get(handlers::serve_asset))
        .route(AUTH_ROUTE, get(handlers::auth))
        .fallback(handlers::relay)
        .layer(axum::middleware::from_fn(common::request_logger))
        .with_state(state)
}
