//! 路由配置模块
//!
//! 单一端点：`POST /` 计算，`GET /` 存活探针。

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::post,
};
use fizzbuzz_shared::{config::CorsConfig, observability::middleware as obs_middleware};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::{handlers, middleware::output_cache, state::AppState};

/// 构建 API 路由
///
/// 输出缓存只作用于 `POST /`（包括该路径上不支持方法的 405 回退），
/// 健康检查不经过缓存。请求体上限对缓存中间件和处理器一致生效。
pub fn api_routes(state: AppState) -> Router<AppState> {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route(
            "/",
            post(handlers::fizzbuzz::process)
                .layer(middleware::from_fn_with_state(state, output_cache))
                .get(handlers::health::health_check),
        )
        .layer(DefaultBodyLimit::max(body_limit))
}

/// 构建 CORS 层
///
/// 配置中包含 "*" 时允许任意来源，否则只允许列出的来源。
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.iter().any(|o| o == "*") {
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", config.allowed_origins.join(","));
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 构建完整应用：路由 + CORS + 可观测性中间件
pub fn app(state: AppState, cors: &CorsConfig) -> Router {
    api_routes(state.clone())
        .layer(cors_layer(cors))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
