//! 缓存键生成

use axum::http::Method;
use sha2::{Digest, Sha256};

/// 缓存键生成器
pub struct CacheKey;

impl CacheKey {
    /// 构建缓存键
    ///
    /// 格式：`{METHOD}:{path}?{排序后的查询参数}[#{请求体 SHA-256}]`。
    /// 查询参数按键值排序，参数顺序不同的相同请求得到同一个键。
    pub fn build(method: &Method, path: &str, query: Option<&str>, body: Option<&[u8]>) -> String {
        let mut key = format!("{}:{}?{}", method, path, Self::normalize_query(query));

        if let Some(body) = body {
            key.push('#');
            key.push_str(&format!("{:x}", Sha256::digest(body)));
        }

        key
    }

    fn normalize_query(query: Option<&str>) -> String {
        let mut pairs: Vec<(&str, &str)> = query
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .collect();
        pairs.sort_unstable();

        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}
