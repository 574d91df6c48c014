//! 输出缓存中间件
//!
//! 挂在幂等的 POST 接口上，按以下流程处理每个请求：
//! 1. 根据 HTTP 方法计算缓存决策，不允许缓存时直接放行
//! 2. 缓冲请求体并生成缓存键（查询串 + 可选的请求体哈希）
//! 3. 命中则直接返回缓存响应，附带 `age` 头
//! 4. 未命中则合并相同键的并发请求，只执行一次下游处理，
//!    响应完成后按状态码决定是否写入缓存
//!
//! 缓存层的任何失败都退化为直接处理，不影响请求本身。

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use fizzbuzz_shared::observability::metrics;
use tracing::{debug, error};

use crate::cache::{CacheDecision, CacheHit, CacheKey, CachedResponse};
use crate::error::{ApiError, PROBLEM_JSON};
use crate::state::AppState;

/// 缓存状态响应头
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

pub async fn output_cache(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let decision = state.cache_policy.on_request(request.method());
    if !decision.enabled {
        return next.run(request).await;
    }

    if !decision.allow_lookup && !decision.allow_storage {
        metrics::record_cache_lookup("bypass");
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => return ApiError::from_body_error(e).into_response(),
    };

    let body_for_key = decision.vary_by_body.then_some(&bytes[..]);
    let key = CacheKey::build(&parts.method, parts.uri.path(), parts.uri.query(), body_for_key);

    if decision.allow_lookup {
        if let Some(hit) = state.cache.get(&key) {
            debug!(key = %key, age_secs = hit.age.as_secs(), "Output cache hit");
            metrics::record_cache_lookup("hit");
            return hit_response(hit);
        }
    }
    metrics::record_cache_lookup("miss");

    let request = Request::from_parts(parts, Body::from(bytes));
    let cache = Arc::clone(&state.cache);

    let response = if decision.allow_locking {
        let store_key = key.clone();
        let coalesced = cache
            .coalesce(&key, move || execute(state, store_key, decision, next, request))
            .await;
        if !coalesced.leader {
            debug!(key = %key, "Served coalesced response");
        }
        coalesced.response
    } else {
        execute(state, key, decision, next, request).await
    };

    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static("MISS"));
    response
}

/// 执行下游处理，缓冲响应并按决策写入缓存
async fn execute(
    state: AppState,
    key: String,
    decision: CacheDecision,
    next: Next,
    request: Request,
) -> CachedResponse {
    // 上一个执行者可能在本请求查找缓存之后、进入合并之前刚写入
    if decision.allow_lookup {
        if let Some(hit) = state.cache.get(&key) {
            return hit.response;
        }
    }

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Failed to buffer response body");
            return error_response(&ApiError::Internal(e.to_string()));
        }
    };

    let decision = decision.on_response(parts.status);
    if decision.allow_storage {
        let cached = CachedResponse::new(parts.status, parts.headers.clone(), bytes.clone());
        if state.cache.insert(key.clone(), cached, decision.ttl) {
            debug!(key = %key, ttl_secs = decision.ttl.as_secs(), "Stored response in output cache");
        }
    } else {
        debug!(key = %key, status = parts.status.as_u16(), "Response not cacheable");
    }

    CachedResponse::new(parts.status, parts.headers, bytes)
}

fn hit_response(hit: CacheHit) -> Response {
    let age = hit.age.as_secs();
    let mut response = hit.response.into_response();
    let headers = response.headers_mut();
    headers.insert(header::AGE, HeaderValue::from(age));
    headers.insert(X_CACHE, HeaderValue::from_static("HIT"));
    response
}

fn error_response(err: &ApiError) -> CachedResponse {
    let body = serde_json::to_vec(&err.problem()).unwrap_or_default();
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
    CachedResponse::new(err.status_code(), headers, Bytes::from(body))
}
