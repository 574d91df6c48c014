//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use fizzbuzz_engine::{EngineLimits, FizzBuzzEngine, TracingLogger};
use fizzbuzz_shared::config::{AppConfig, CacheConfig, ServerConfig};

use crate::cache::{CachePolicy, ResponseCache};

/// Axum 应用共享状态
///
/// 规则引擎无状态，响应缓存通过 Arc 在请求间共享
#[derive(Clone)]
pub struct AppState {
    pub engine: FizzBuzzEngine,
    pub cache: Arc<ResponseCache>,
    pub cache_policy: CachePolicy,
    /// 请求体大小上限（字节）
    pub max_body_bytes: usize,
}

impl AppState {
    /// 根据应用配置创建状态
    pub fn new(config: &AppConfig) -> Self {
        let limits = EngineLimits::default().with_max_bound(config.engine.max_bound);
        let engine = FizzBuzzEngine::with_limits(limits, Arc::new(TracingLogger));
        Self::with_engine(engine, &config.cache)
            .with_max_body_bytes(config.server.max_body_bytes)
    }

    /// 使用指定引擎创建状态（测试中可注入自定义日志实现）
    pub fn with_engine(engine: FizzBuzzEngine, cache_config: &CacheConfig) -> Self {
        Self {
            engine,
            cache: Arc::new(ResponseCache::new(cache_config.max_entries)),
            cache_policy: CachePolicy::from_config(cache_config),
            max_body_bytes: ServerConfig::default().max_body_bytes,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
