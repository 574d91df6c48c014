//! 内存响应缓存
//!
//! 基于 DashMap 实现的进程内输出缓存，支持：
//! - 按 TTL 过期，过期条目在读取时淘汰，并由后台任务定期清理
//! - 容量上限，缓存满时跳过写入而不是让请求失败
//! - 请求合并：相同缓存键的并发请求只执行一次计算，其余请求等待并共享结果

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use fizzbuzz_shared::observability::metrics;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// 已缓冲的完整响应
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// 缓存命中结果
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub response: CachedResponse,
    /// 条目写入至今的时长
    pub age: Duration,
}

#[derive(Debug)]
struct CacheEntry {
    response: CachedResponse,
    stored_at: Instant,
    expires_at: Instant,
}

/// 请求合并的结果
#[derive(Debug, Clone)]
pub struct Coalesced {
    pub response: CachedResponse,
    /// 是否由当前调用者执行了计算
    pub leader: bool,
}

/// 进程内响应缓存
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    in_flight: DashMap<String, Arc<OnceCell<CachedResponse>>>,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            max_entries,
        }
    }

    /// 读取未过期的缓存条目，过期条目顺带淘汰
    pub fn get(&self, key: &str) -> Option<CacheHit> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<CacheHit> {
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                return Some(CacheHit {
                    response: entry.response.clone(),
                    age: now.saturating_duration_since(entry.stored_at),
                });
            }
            Some(_) => {}
            None => return None,
        }

        // 读锁已释放，再按条件删除，避免删掉并发写入的新条目
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    /// 写入缓存，返回是否写入成功
    ///
    /// 缓存已满时先清理过期条目，仍然满则放弃写入。
    pub fn insert(&self, key: String, response: CachedResponse, ttl: Duration) -> bool {
        self.insert_at(key, response, ttl, Instant::now())
    }

    fn insert_at(&self, key: String, response: CachedResponse, ttl: Duration, now: Instant) -> bool {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.purge_expired_at(now);
            if self.entries.len() >= self.max_entries {
                warn!(
                    max_entries = self.max_entries,
                    "Output cache is full, skipping storage"
                );
                return false;
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                response,
                stored_at: now,
                expires_at: now + ttl,
            },
        );
        metrics::set_cache_entries(self.entries.len());
        true
    }

    /// 清理所有过期条目，返回清理数量
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Purged expired output cache entries");
        }
        metrics::set_cache_entries(self.entries.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 合并相同缓存键的并发计算
    ///
    /// 第一个到达的调用者执行 `compute`，其余调用者等待并拿到同一份响应。
    /// 若执行者在完成前被取消，下一个等待者接手计算。
    pub async fn coalesce<F, Fut>(&self, key: &str, compute: F) -> Coalesced
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CachedResponse>,
    {
        let cell = self
            .in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();

        let mut leader = false;
        let response = cell
            .get_or_init(|| {
                leader = true;
                compute()
            })
            .await
            .clone();

        self.in_flight
            .remove_if(key, |_, current| Arc::ptr_eq(current, &cell));

        Coalesced { response, leader }
    }

    /// 当前进行中的合并计算数量
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}
