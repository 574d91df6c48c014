//! 输出缓存清理 Worker
//!
//! 过期条目在读取时才会被淘汰，长时间无人访问的键需要后台定期清理，
//! 避免内存占用持续增长。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::ResponseCache;

/// 缓存清理 Worker
pub struct CacheSweeper {
    cache: Arc<ResponseCache>,
    /// 清理间隔
    interval: Duration,
}

impl CacheSweeper {
    pub fn new(cache: Arc<ResponseCache>, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// 主循环：持续清理直到进程退出
    pub async fn run(&self) {
        info!(interval = ?self.interval, "CacheSweeper 已启动");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.sweep_once();
        }
    }

    /// 执行一次清理，返回清理数量
    pub fn sweep_once(&self) -> usize {
        let removed = self.cache.purge_expired();
        debug!(removed, remaining = self.cache.len(), "Output cache swept");
        removed
    }
}
