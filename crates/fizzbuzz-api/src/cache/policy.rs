//! 输出缓存策略
//!
//! 接口虽然使用 POST，但按约定是幂等的，因此允许缓存 POST 响应。
//! 请勿把该策略用于非幂等接口。
//!
//! 策略由两个纯函数组成，由缓存中间件在请求到达和响应完成时分别调用：
//! - [`decide_caching`]：根据 HTTP 方法决定是否允许查找和写入缓存
//! - [`decide_storage`]：根据响应状态码决定是否允许写入缓存

use std::time::Duration;

use axum::http::{Method, StatusCode};
use fizzbuzz_shared::config::CacheConfig;

/// 默认响应新鲜期
pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// 单次请求的缓存决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheDecision {
    /// 是否启用输出缓存
    pub enabled: bool,
    /// 是否允许从缓存读取
    pub allow_lookup: bool,
    /// 是否允许写入缓存
    pub allow_storage: bool,
    /// 是否允许合并并发的相同请求
    pub allow_locking: bool,
    /// 响应新鲜期
    pub ttl: Duration,
    /// 缓存键是否包含请求体哈希；查询参数（含值）始终参与缓存键
    pub vary_by_body: bool,
}

impl CacheDecision {
    /// 响应完成后更新决策：非 200/301 的响应一律不写入
    pub fn on_response(self, status: StatusCode) -> Self {
        Self {
            allow_storage: self.allow_storage && decide_storage(status),
            ..self
        }
    }
}

/// 请求到达时的缓存决策
///
/// 仅 GET / HEAD / POST 允许查找和写入；请求合并始终开启。
pub fn decide_caching(method: &Method, ttl: Duration) -> CacheDecision {
    let attempt = is_cacheable_method(method);
    CacheDecision {
        enabled: true,
        allow_lookup: attempt,
        allow_storage: attempt,
        allow_locking: true,
        ttl,
        vary_by_body: true,
    }
}

/// 响应状态码是否允许写入缓存
pub fn decide_storage(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::MOVED_PERMANENTLY
}

fn is_cacheable_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::POST
}

/// 由配置构建的缓存策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub enabled: bool,
    pub ttl: Duration,
    pub vary_by_body: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_TTL,
            vary_by_body: true,
        }
    }
}

impl CachePolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            ttl: config.ttl(),
            vary_by_body: config.vary_by_body,
        }
    }

    /// 在方法决策之上叠加配置开关
    pub fn on_request(&self, method: &Method) -> CacheDecision {
        CacheDecision {
            enabled: self.enabled,
            vary_by_body: self.vary_by_body,
            ..decide_caching(method, self.ttl)
        }
    }
}
